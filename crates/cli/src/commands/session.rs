//! Session id commands.

use verdant_client::{FileStorage, SessionProvider};

/// Print the session id, creating one if none is stored.
pub fn show(sessions: &SessionProvider<FileStorage>) -> Result<(), Box<dyn std::error::Error>> {
    let session = sessions.session_id()?;
    println!("{session}");
    tracing::debug!(path = %sessions.storage().path().display(), "Session state file");
    Ok(())
}

/// Forget the stored session id.
pub fn reset(sessions: &SessionProvider<FileStorage>) -> Result<(), Box<dyn std::error::Error>> {
    sessions.reset()?;
    println!("Session reset; the next cart command starts a new cart");
    Ok(())
}
