//! Admin review of collector applications.

use std::io::{self, Write};

use oh_core::ids::UserId;
use oh_core::user::PendingApplication;
use tracing::{info_span, Instrument};

use crate::bootstrap::AppRuntime;

/// Lists applications waiting for a decision, one per line, with the ids
/// `approve` and `reject` take.
pub async fn pending(runtime: &AppRuntime) -> anyhow::Result<()> {
    let span = info_span!("command.admin.pending");
    async {
        let rows = runtime.usecases().decide_application().pending().await?;
        runtime.cookies().persist().await;
        write_pending(&rows, &mut io::stdout().lock())?;
        Ok(())
    }
    .instrument(span)
    .await
}

fn write_pending(rows: &[PendingApplication], out: &mut impl Write) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "No pending applications.");
    }
    for row in rows {
        writeln!(
            out,
            "{}\t{}\t{}\t{:?}\t{}",
            row.id,
            row.full_name(),
            row.contact().unwrap_or("-"),
            row.payment_status,
            row.applied_at
        )?;
    }
    Ok(())
}

pub async fn approve(runtime: &AppRuntime, id: &str, name: &str) -> anyhow::Result<()> {
    let span = info_span!("command.admin.approve", id);
    async {
        runtime
            .usecases()
            .decide_application()
            .approve(&UserId::from(id), name)
            .await?;
        runtime.cookies().persist().await;
        Ok(())
    }
    .instrument(span)
    .await
}

pub async fn reject(runtime: &AppRuntime, id: &str, contact: &str) -> anyhow::Result<()> {
    let span = info_span!("command.admin.reject", id);
    async {
        runtime
            .usecases()
            .decide_application()
            .reject(&UserId::from(id), contact)
            .await?;
        runtime.cookies().persist().await;
        Ok(())
    }
    .instrument(span)
    .await
}
