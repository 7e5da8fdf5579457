use std::error::Error;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub(crate) fn read_file<P: AsRef<Path>>(path: P) -> Result<String, Box<dyn Error>> {
    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    Ok(text)
}

/// Truncates the file if it exists. Missing parent directories are not created.
pub(crate) fn write_file<P: AsRef<Path>>(path: P, text: &str) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    let mut out = BufWriter::new(file);
    out.write_all(text.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Writes `name` inside `dir`, creating `dir` first if needed. Returns the full path.
pub(crate) fn write_in<P: AsRef<Path>>(
    dir: P,
    name: &str,
    text: &str,
) -> Result<PathBuf, Box<dyn Error>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    write_file(&path, text)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;

    #[test]
    fn write_then_read() {
        let path = env::temp_dir().join(format!("box-pusher-fs-{}.txt", std::process::id()));
        write_file(&path, "1\n0.500 0.500 0.000\n").unwrap();
        assert_eq!(read_file(&path).unwrap(), "1\n0.500 0.500 0.000\n");
        // shorter text truncates
        write_file(&path, "0\n").unwrap();
        assert_eq!(read_file(&path).unwrap(), "0\n");
        fs::remove_file(&path).unwrap();

        assert!(read_file(env::temp_dir().join("box-pusher-does-not-exist.txt")).is_err());
    }

    #[test]
    fn write_in_creates_the_directory() {
        let dir = env::temp_dir()
            .join(format!("box-pusher-dump-{}", std::process::id()))
            .join("nested");
        let path = write_in(&dir, "from.txt", "0.050 0.1 0.1 0.0\n").unwrap();
        assert_eq!(path, dir.join("from.txt"));
        assert_eq!(read_file(&path).unwrap(), "0.050 0.1 0.1 0.0\n");
        fs::remove_dir_all(dir.parent().unwrap()).unwrap();
    }
}
