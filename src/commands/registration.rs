//! Registration commands: collector signup, public users and sub-accounts.

use std::path::Path;

use anyhow::{anyhow, Context};
use oh_core::registration::Upload;
use oh_core::session::SignupField;
use tracing::{info, info_span, Instrument};

use super::wizard::drive_wizard;
use crate::bootstrap::AppRuntime;
use crate::cli::{RegisterArgs, SignupArgs, SubAccountArgs};
use crate::prompt::Prompter;

async fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Upload::from_file_name(file_name, bytes))
}

/// Collector self-signup. Fields not given on the command line come from the
/// saved signup draft. When that draft already belongs to an accepted
/// application, the run continues at verification without registering again.
pub async fn signup(runtime: &AppRuntime, args: SignupArgs) -> anyhow::Result<()> {
    let span = info_span!("command.registration.signup");
    async {
        let mut prompter = Prompter::stdio();
        let wizard = runtime.usecases().collector_signup_wizard().await;

        if let Some(receipt) = wizard.receipt().await {
            info!(application_id = %receipt.application_id, "resuming collector signup");
            prompter.say(format!(
                "Continuing signup for application {} ({})",
                receipt.application_id, receipt.contact
            ))?;
            drive_wizard(&wizard, &mut prompter, args.payment.payment_method).await?;
            runtime.cookies().persist().await;
            return Ok(());
        }

        let password = match args.password {
            Some(password) => password,
            None => prompter.ask("Password")?,
        };
        let confirm_password = match args.confirm_password {
            Some(confirm) => confirm,
            None => prompter.ask("Confirm password")?,
        };

        wizard
            .update_draft(|draft| {
                let given = [
                    (SignupField::FirstName, args.first_name),
                    (SignupField::LastName, args.last_name),
                    (SignupField::ContactInfo, args.contact),
                    (SignupField::Password, Some(password)),
                    (SignupField::ConfirmPassword, Some(confirm_password)),
                ];
                for (field, value) in given {
                    if let Some(value) = value {
                        draft.set_field(field, value);
                    }
                }
            })
            .await?;

        drive_wizard(&wizard, &mut prompter, args.payment.payment_method).await?;
        runtime.cookies().persist().await;
        info!("collector signup finished");
        Ok(())
    }
    .instrument(span)
    .await
}

/// Public-user registration by an operator.
pub async fn register(runtime: &AppRuntime, args: RegisterArgs) -> anyhow::Result<()> {
    let span = info_span!("command.registration.register");
    async {
        let photo = read_upload(&args.photo).await?;
        let signature = read_upload(&args.signature).await?;
        let wizard = runtime.usecases().public_registration_wizard().await;

        wizard
            .update_draft(|draft| {
                draft.first_name = args.first_name;
                draft.last_name = args.last_name;
                draft.contact_value = args.contact;
                draft.name_bn = args.name_bn;
                draft.father_name = args.father_name;
                draft.mother_name = args.mother_name;
                draft.spouse_name = args.spouse_name;
                draft.nid = args.nid;
                draft.date_of_birth = args.date_of_birth;
                draft.gender = args.gender;
                draft.blood_group = args.blood_group;
                draft.present_address = args.present_address;
                for (level, id) in args.address.selected() {
                    draft.address.select(level, id);
                }
                draft.photo = Some(photo);
                draft.signature = Some(signature);
            })
            .await?;

        let mut prompter = Prompter::stdio();
        drive_wizard(&wizard, &mut prompter, args.payment.payment_method).await?;
        runtime.cookies().persist().await;
        if let Some(receipt) = wizard.receipt().await {
            println!("Application id: {}", receipt.application_id);
        }
        Ok(())
    }
    .instrument(span)
    .await
}

/// Sub-account under an existing public user. The OTP goes to the parent.
pub async fn sub_account(runtime: &AppRuntime, args: SubAccountArgs) -> anyhow::Result<()> {
    let span = info_span!("command.registration.sub_account", term = %args.parent);
    async {
        let mut prompter = Prompter::stdio();
        let parents = runtime
            .usecases()
            .search_parent_accounts()
            .execute(&args.parent)
            .await?;
        if parents.is_empty() {
            return Err(anyhow!("no parent account matches '{}'", args.parent));
        }

        let parent = match &args.parent_id {
            Some(id) => parents
                .into_iter()
                .find(|p| p.id.as_str() == id)
                .ok_or_else(|| anyhow!("no parent account with id {id} matches the search"))?,
            None => {
                let labels: Vec<String> = parents
                    .iter()
                    .map(|p| {
                        let contact = p
                            .contact()
                            .map(|c| c.to_string())
                            .unwrap_or_else(|| "no contact".to_string());
                        format!("{} [{}] {contact}, {} sub-accounts", p.full_name(), p.id, p.child_count)
                    })
                    .collect();
                let index = prompter.choose("Parent account", &labels)?;
                parents
                    .into_iter()
                    .nth(index)
                    .ok_or_else(|| anyhow!("parent selection out of range"))?
            }
        };
        prompter.say(format!("Parent: {} ({})", parent.full_name(), parent.id))?;

        let photo = read_upload(&args.photo).await?;
        let signature = read_upload(&args.signature).await?;
        let wizard = runtime.usecases().sub_account_wizard().await;
        wizard
            .update_draft(|draft| {
                draft.parent = Some(parent);
                draft.first_name = args.first_name;
                draft.last_name = args.last_name;
                draft.name_bn = args.name_bn;
                draft.date_of_birth = Some(args.date_of_birth);
                draft.gender = Some(args.gender);
                draft.blood_group = Some(args.blood_group);
                draft.guardian_nid = args.guardian_nid;
                draft.relationship = Some(args.relationship);
                draft.photo = Some(photo);
                draft.signature = Some(signature);
            })
            .await?;

        drive_wizard(&wizard, &mut prompter, args.payment.payment_method).await?;
        runtime.cookies().persist().await;
        Ok(())
    }
    .instrument(span)
    .await
}
