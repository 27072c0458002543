use super::{Outcome, Shell, ShellError};
use std::env;
use std::io::Write;
use std::path::PathBuf;

impl<O: Write, E: Write> Shell<O, E> {
    /// Print how the last foreground process ended
    pub(crate) fn builtin_status(&mut self) -> Result<Outcome, ShellError> {
        writeln!(self.out, "{}", self.state.last_status)?;
        self.out.flush()?;
        Ok(Outcome::Continue)
    }

    /// Change directory: `$HOME` with no argument, else the one argument
    pub(crate) fn builtin_cd(&mut self, args: &[String]) -> Result<Outcome, ShellError> {
        let dir = match args {
            [] => env::var_os("HOME")
                .map(PathBuf::from)
                .ok_or(ShellError::NoHome)?,
            [path] => PathBuf::from(path),
            _ => return Err(ShellError::CdTooManyArgs),
        };

        env::set_current_dir(&dir).map_err(|source| ShellError::Cd {
            path: dir.clone(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "changed directory");
        Ok(Outcome::Continue)
    }

    /// Terminate background jobs and ask the read loop to stop
    pub(crate) fn builtin_exit(&mut self) -> Result<Outcome, ShellError> {
        self.shutdown();
        Ok(Outcome::Exit)
    }
}
