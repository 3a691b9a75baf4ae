//! CLI commands. Each one runs inside a `command.*` span and reaches the
//! domain only through `runtime.usecases()`.

pub mod admin;
pub mod lookup;
pub mod registration;
pub mod session;
pub mod wizard;

use crate::bootstrap::AppRuntime;
use crate::cli::Command;

pub async fn dispatch(runtime: &AppRuntime, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login {
            identifier,
            password,
            role,
        } => session::login(runtime, &identifier, password, role).await,
        Command::Logout => session::logout(runtime).await,
        Command::Whoami => session::whoami(runtime).await,
        Command::Session => session::show_session(runtime).await,
        Command::Guard { path } => session::guard(runtime, &path).await,
        Command::Signup(args) => registration::signup(runtime, args).await,
        Command::Register(args) => registration::register(runtime, args).await,
        Command::SubAccount(args) => registration::sub_account(runtime, args).await,
        Command::Pending => admin::pending(runtime).await,
        Command::Approve { id, name } => admin::approve(runtime, &id, &name).await,
        Command::Reject { id, contact } => admin::reject(runtime, &id, &contact).await,
        Command::Address { level, parent } => lookup::address(runtime, level, parent).await,
        Command::SearchParent { term } => lookup::search_parent(runtime, &term).await,
    }
}
