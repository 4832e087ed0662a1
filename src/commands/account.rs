//! Account command handlers: login, register, logout and whoami.

use std::io::{self, BufRead, IsTerminal, Read, Write};

use anyhow::{Context, Result, bail};
use launcher_core::{Credentials, LauncherContext, login, register};
use tracing::info;

use super::{ensure_version, user_facing};
use crate::cli::{LoginArgs, RegisterArgs};

pub async fn run_login_command(ctx: &LauncherContext, args: &LoginArgs) -> Result<()> {
    let password = read_secrets(&["Password"])?
        .into_iter()
        .next()
        .unwrap_or_default();
    let credentials = Credentials {
        email: args.email.clone(),
        password,
        ..Credentials::default()
    };

    ensure_version(ctx).await?;
    let outcome = login(&ctx.api, &ctx.sessions, &credentials, !args.no_remember)
        .await
        .map_err(|e| user_facing(&e))?;

    println!("Logged in as {}", outcome.session.email);
    if !outcome.remembered {
        info!("session kept for this run only");
    }
    Ok(())
}

pub async fn run_register_command(ctx: &LauncherContext, args: &RegisterArgs) -> Result<()> {
    let mut secrets = read_secrets(&["Password", "Confirm password"])?;
    let confirm_password = secrets.pop().unwrap_or_default();
    let password = secrets.pop().unwrap_or_default();
    let credentials = Credentials {
        username: args.username.clone(),
        email: args.email.clone(),
        password,
        confirm_password,
    };

    ensure_version(ctx).await?;
    let outcome = register(&ctx.api, &ctx.sessions, &credentials, !args.no_remember)
        .await
        .map_err(|e| user_facing(&e))?;

    if outcome.is_logged_in() {
        println!("Registered and logged in as {}", outcome.session.email);
    } else {
        println!("Registered {}. Log in to continue.", outcome.session.email);
    }
    Ok(())
}

pub fn run_logout_command(ctx: &LauncherContext) -> Result<()> {
    ctx.sessions.clear().context("Failed to remove the saved session")?;
    println!("Logged out");
    Ok(())
}

pub fn run_whoami_command(ctx: &LauncherContext) -> Result<()> {
    let session = ctx.sessions.session();
    if session.is_logged_in() {
        match &session.username {
            Some(username) => println!("{username} <{}>", session.email),
            None => println!("{}", session.email),
        }
    } else {
        println!("Not logged in");
    }
    Ok(())
}

/// Reads one secret per prompt: line by line from piped stdin, or
/// interactively from a terminal.
fn read_secrets(prompts: &[&str]) -> Result<Vec<String>> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut buffer = String::new();
        stdin.lock().read_to_string(&mut buffer)?;
        let lines: Vec<String> = buffer
            .lines()
            .take(prompts.len())
            .map(str::to_string)
            .collect();
        if lines.len() < prompts.len() {
            bail!(
                "Expected {} line(s) on stdin: {}",
                prompts.len(),
                prompts.join(", ")
            );
        }
        return Ok(lines);
    }

    let mut secrets = Vec::with_capacity(prompts.len());
    for prompt in prompts {
        eprint!("{prompt}: ");
        io::stderr().flush()?;
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        secrets.push(line.trim_end_matches(['\r', '\n']).to_string());
    }
    Ok(secrets)
}
