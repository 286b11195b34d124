use std::fmt;

/// Errors raised while running the extraction tool
#[derive(Debug)]
pub enum ExtractError {
    /// The tool could not be started at all
    Spawn(std::io::Error),
    /// Reading the tool's output or touching the download directory failed
    Io(std::io::Error),
    /// The tool ran but exited unsuccessfully
    Failed {
        /// Exit status as reported by the OS
        status: String,
        /// Best description of the failure taken from the tool's output
        message: String,
    },
    /// The tool finished without printing the metadata line
    MissingMetadata,
    /// The blocking worker panicked or was cancelled
    Worker(String),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Spawn(e) => write!(f, "Failed to start yt-dlp: {}", e),
            ExtractError::Io(e) => write!(f, "I/O error: {}", e),
            ExtractError::Failed { status, message } => {
                if message.is_empty() {
                    write!(f, "yt-dlp exited with {}", status)
                } else {
                    write!(f, "{}", message)
                }
            }
            ExtractError::MissingMetadata => write!(f, "yt-dlp did not report the downloaded file"),
            ExtractError::Worker(msg) => write!(f, "Download worker failed: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Spawn(e) | ExtractError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io(err)
    }
}
