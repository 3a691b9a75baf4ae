//! Session commands: login, logout and what the client knows about the user.

use oh_core::route_guard::{RouteDecision, LOGIN_PATH};
use oh_core::session::Role;
use tracing::{info_span, Instrument};

use crate::bootstrap::AppRuntime;
use crate::prompt::Prompter;

pub async fn login(
    runtime: &AppRuntime,
    identifier: &str,
    password: Option<String>,
    role: Role,
) -> anyhow::Result<()> {
    let span = info_span!("command.session.login", %role);
    async {
        let password = match password {
            Some(password) => password,
            None => Prompter::stdio().ask("Password")?,
        };

        let login_page = runtime.usecases().guard_route().watch(LOGIN_PATH);
        let outcome = runtime
            .usecases()
            .login()
            .execute(identifier, &password, role)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Login failed");
                e
            })?;
        runtime.cookies().persist().await;

        println!(
            "Logged in as {} {} ({role})",
            outcome.session.first_name, outcome.session.last_name
        );
        println!("Continue at {}", outcome.landing_path);
        if let RouteDecision::Redirect(to) = login_page.current() {
            tracing::debug!(%to, "login page now redirects");
        }
        Ok(())
    }
    .instrument(span)
    .await
}

pub async fn logout(runtime: &AppRuntime) -> anyhow::Result<()> {
    let span = info_span!("command.session.logout");
    async {
        let result = runtime.usecases().logout().execute().await;
        runtime.cookies().forget().await;
        result
    }
    .instrument(span)
    .await
}

pub async fn whoami(runtime: &AppRuntime) -> anyhow::Result<()> {
    let span = info_span!("command.session.whoami");
    async {
        let user = runtime
            .usecases()
            .fetch_current_user()
            .execute()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch current user");
                e
            })?;
        runtime.cookies().persist().await;
        println!("{}", serde_json::to_string_pretty(&user)?);
        Ok(())
    }
    .instrument(span)
    .await
}

pub async fn show_session(runtime: &AppRuntime) -> anyhow::Result<()> {
    let state = runtime.app_state().snapshot().await;
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}

pub async fn guard(runtime: &AppRuntime, path: &str) -> anyhow::Result<()> {
    let span = info_span!("command.session.guard", path);
    async {
        match runtime.usecases().guard_route().execute(path).await {
            RouteDecision::Allow => println!("allow {path}"),
            RouteDecision::Redirect(to) => println!("redirect {path} -> {to}"),
        }
        Ok(())
    }
    .instrument(span)
    .await
}
