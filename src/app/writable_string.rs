use std::{fmt::Display, io::Write};

// collects the help messages clap writes, so that they can go through the logger
#[derive(Default)]
pub(crate) struct WritableString(String);

impl Write for WritableString {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.push_str(&String::from_utf8_lossy(buf));
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Display for WritableString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_writes() {
        let mut s = WritableString::default();
        write!(s, "USAGE:\n    hexprop {}", "solve").unwrap();
        s.flush().unwrap();
        assert_eq!("USAGE:\n    hexprop solve", s.to_string())
    }
}
