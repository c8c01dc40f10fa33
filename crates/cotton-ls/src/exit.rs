use std::process::ExitCode;

/// Outcome of a command, with an optional summary line for the user.
#[derive(Debug, PartialEq, Eq)]
pub struct Exit {
    status: ExitStatus,
    message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExitStatus {
    Success,
    Error,
}

impl Exit {
    #[must_use]
    pub fn success() -> Self {
        Self {
            status: ExitStatus::Success,
            message: None,
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self {
            status: ExitStatus::Error,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Print the summary, if any, and turn the outcome into a process code.
    pub fn report(self, quiet: bool) -> ExitCode {
        if let Some(message) = self.message.as_deref().filter(|_| !quiet) {
            match self.status {
                ExitStatus::Success => println!("{message}"),
                ExitStatus::Error => eprintln!("{message}"),
            }
        }
        self.into()
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        match exit.status {
            ExitStatus::Success => ExitCode::SUCCESS,
            ExitStatus::Error => ExitCode::FAILURE,
        }
    }
}
