//! Drives a registration wizard from its current step to `Success`, asking
//! for the OTP and the payment method on the terminal.

use std::io::{BufRead, Write};

use anyhow::anyhow;
use oh_app::usecases::{RegistrationFlow, WizardFlowError, WizardOrchestrator};
use oh_core::payment::PaymentMethod;
use oh_core::verification::VerificationState;
use oh_core::wizard::{WizardState, WizardStep};
use tracing::debug;

use crate::prompt::Prompter;

const RESEND_KEYWORD: &str = "r";

pub async fn drive_wizard<F, R, W>(
    wizard: &WizardOrchestrator<F>,
    prompter: &mut Prompter<R, W>,
    payment_method: Option<PaymentMethod>,
) -> anyhow::Result<WizardState>
where
    F: RegistrationFlow,
    R: BufRead,
    W: Write,
{
    let mut announced = None;
    loop {
        let state = wizard.state().await;
        if announced != Some(state.step) {
            prompter.say(format!(
                "Step {}/{}: {}",
                state.position(),
                state.total_steps(),
                step_title(state.step)
            ))?;
            announced = Some(state.step);
        }

        match state.step {
            WizardStep::Success => return Ok(state),
            WizardStep::Verification => verify_contact(wizard, prompter).await?,
            WizardStep::Payment => pay(wizard, prompter, payment_method).await?,
            // Form answers come from the command line; a rejected form ends
            // the run instead of looping on the same values.
            WizardStep::SelectParent | WizardStep::ConfirmParent | WizardStep::Form => {
                wizard.submit_step().await?;
            }
        }
    }
}

fn step_title(step: WizardStep) -> &'static str {
    match step {
        WizardStep::SelectParent => "Select parent account",
        WizardStep::ConfirmParent => "Confirm parent account",
        WizardStep::Form => "Details",
        WizardStep::Verification => "Verify contact",
        WizardStep::Payment => "Payment",
        WizardStep::Success => "Done",
    }
}

async fn verify_contact<F, R, W>(
    wizard: &WizardOrchestrator<F>,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<()>
where
    F: RegistrationFlow,
    R: BufRead,
    W: Write,
{
    if !wizard.state().await.contact_verified {
        if wizard.verification_state().await == VerificationState::Unsent {
            send_code(wizard, prompter).await?;
        }

        loop {
            let input = prompter.ask(&format!(
                "6-digit OTP ('{RESEND_KEYWORD}' to resend)"
            ))?;
            if input.eq_ignore_ascii_case(RESEND_KEYWORD) {
                let remaining = wizard.verification().cooldown_remaining().await;
                if remaining > 0 {
                    prompter.say(format!("You can resend in {remaining}s"))?;
                } else {
                    send_code(wizard, prompter).await?;
                }
                continue;
            }

            match wizard.verify_code(&input).await {
                Ok(state) if state.contact_verified => break,
                Ok(_) => continue,
                // Already shown by the notifier.
                Err(WizardFlowError::Verification(err)) => {
                    debug!(error = %err, "otp not accepted");
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    wizard.submit_step().await?;
    Ok(())
}

async fn send_code<F, R, W>(
    wizard: &WizardOrchestrator<F>,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<()>
where
    F: RegistrationFlow,
    R: BufRead,
    W: Write,
{
    loop {
        match wizard.send_code().await {
            Ok(_) => return Ok(()),
            Err(WizardFlowError::Verification(err)) => {
                debug!(error = %err, "otp not sent");
                if !prompter.confirm("Try sending the OTP again?")? {
                    return Err(anyhow!("contact verification abandoned"));
                }
            }
            Err(other) => return Err(other.into()),
        }
    }
}

async fn pay<F, R, W>(
    wizard: &WizardOrchestrator<F>,
    prompter: &mut Prompter<R, W>,
    preferred: Option<PaymentMethod>,
) -> anyhow::Result<()>
where
    F: RegistrationFlow,
    R: BufRead,
    W: Write,
{
    let mut method = preferred;
    loop {
        let chosen = match method {
            Some(method) => method,
            None => prompter.ask_parsed("Payment method (bkash/nagad)")?,
        };
        wizard.select_payment_method(chosen).await;

        match wizard.submit_step().await {
            Ok(_) => return Ok(()),
            Err(WizardFlowError::StepFailed(err)) => {
                debug!(error = %err, "payment step failed");
                if !prompter.confirm("Retry the payment?")? {
                    return Err(anyhow!("payment not completed: {err}"));
                }
                if preferred.is_none() {
                    method = None;
                }
            }
            Err(other) => return Err(other.into()),
        }
    }
}
