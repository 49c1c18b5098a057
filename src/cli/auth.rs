//! Login, logout and whoami
//!
//! A successful login is written to `session.json` so later invocations act
//! as the same user until `logout`.

use crate::auth::SessionFile;
use crate::error::{RegisterError, RegisterResult};

use super::RegisterApp;

/// Handle `register login`
pub async fn handle_login(app: &RegisterApp, name: &str, password: Option<String>) -> RegisterResult<()> {
    let password = match password {
        Some(password) => password,
        None => prompt_password(&format!("Password for {}: ", name))?,
    };

    let actor = app.auth().login(name, &password).await?;
    let session = SessionFile::start(actor);
    session.save(&app.paths.session_file())?;

    println!("Logged in as {}", session.actor.name);
    println!("  Session: {}", session.session_id);
    if session.actor.admin {
        println!("  Role: admin");
    }
    Ok(())
}

/// Handle `register logout`
pub async fn handle_logout(app: &RegisterApp) -> RegisterResult<()> {
    let signed_out = app.auth().logout().await?;
    SessionFile::clear(&app.paths.session_file())?;

    match signed_out {
        Some(actor) => println!("Logged out {}", actor.name),
        None => println!("Not logged in."),
    }
    Ok(())
}

/// Handle `register whoami`
pub fn handle_whoami(app: &RegisterApp) -> RegisterResult<()> {
    match SessionFile::load(&app.paths.session_file())? {
        Some(session) => {
            println!("{} (user #{})", session.actor.name, session.actor.id);
            println!("  Session: {}", session.session_id);
            println!(
                "  Since:   {}",
                session.started_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        None => println!("Not logged in. Changes will not be audited."),
    }
    Ok(())
}

/// Prompt for a password (hidden input)
pub fn prompt_password(prompt: &str) -> RegisterResult<String> {
    rpassword::prompt_password(prompt)
        .map_err(|e| RegisterError::Auth(format!("Failed to read password: {}", e)))
}
