//! Command-line interface.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use oh_core::address::AddressLevel;
use oh_core::payment::PaymentMethod;
use oh_core::registration::{BloodGroup, Gender, Relationship};
use oh_core::session::Role;

#[derive(Parser, Debug)]
#[command(name = "onehealth", version, about = "OneHealth registration client")]
pub struct Cli {
    /// Config file (defaults to <data dir>/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, overrides the config file and ONEHEALTH_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and persist the session
    Login {
        /// Phone number or email address
        #[arg(short, long)]
        identifier: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
        /// admin, collector or public
        #[arg(short, long, default_value = "collector")]
        role: Role,
    },
    /// Log out; the local session is cleared even if the server call fails
    Logout,
    /// Show the profile of the logged-in user
    Whoami,
    /// Print the persisted session and signup draft
    Session,
    /// Evaluate the route guard for a path
    Guard { path: String },
    /// Data collector self-signup; continues a pending signup at verification
    Signup(SignupArgs),
    /// Register a public user
    Register(RegisterArgs),
    /// Register a sub-account under an existing public user
    SubAccount(SubAccountArgs),
    /// List collector applications waiting for a decision
    Pending,
    /// Approve a data collector application
    Approve {
        id: String,
        /// Applicant name used in the confirmation message
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Reject a data collector application
    Reject {
        id: String,
        /// Contact the backend notifies about the rejection
        #[arg(long)]
        contact: String,
    },
    /// List address options for one level
    Address {
        /// division, district, upazila, union, post-office, village or para
        level: AddressLevel,
        /// Id of the selected parent level
        #[arg(long)]
        parent: Option<u64>,
    },
    /// Search public accounts that can hold sub-accounts
    SearchParent { term: String },
}

/// Shared by the wizards that end with a fee payment.
#[derive(Args, Debug, Clone, Default)]
pub struct PaymentArgs {
    /// bkash or nagad; prompted for when omitted
    #[arg(long)]
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Args, Debug, Clone)]
pub struct SignupArgs {
    /// Falls back to the saved signup draft
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    /// Phone number or email address
    #[arg(long)]
    pub contact: Option<String>,
    /// Prompted for when omitted
    #[arg(long)]
    pub password: Option<String>,
    #[arg(long)]
    pub confirm_password: Option<String>,
    #[command(flatten)]
    pub payment: PaymentArgs,
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    /// Phone number or email address
    #[arg(long)]
    pub contact: String,
    #[arg(long)]
    pub photo: PathBuf,
    #[arg(long)]
    pub signature: PathBuf,
    #[arg(long, default_value = "")]
    pub name_bn: String,
    #[arg(long, default_value = "")]
    pub father_name: String,
    #[arg(long, default_value = "")]
    pub mother_name: String,
    #[arg(long, default_value = "")]
    pub spouse_name: String,
    #[arg(long, default_value = "")]
    pub nid: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: Option<NaiveDate>,
    #[arg(long)]
    pub gender: Option<Gender>,
    #[arg(long)]
    pub blood_group: Option<BloodGroup>,
    #[arg(long, default_value = "")]
    pub present_address: String,
    #[command(flatten)]
    pub address: AddressArgs,
    #[command(flatten)]
    pub payment: PaymentArgs,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AddressArgs {
    #[arg(long)]
    pub division: Option<u64>,
    #[arg(long)]
    pub district: Option<u64>,
    #[arg(long)]
    pub upazila: Option<u64>,
    #[arg(long)]
    pub union: Option<u64>,
    #[arg(long)]
    pub post_office: Option<u64>,
    #[arg(long)]
    pub village: Option<u64>,
    #[arg(long)]
    pub para: Option<u64>,
}

impl AddressArgs {
    /// Selected ids, root level first.
    pub fn selected(&self) -> Vec<(AddressLevel, u64)> {
        [
            (AddressLevel::Division, self.division),
            (AddressLevel::District, self.district),
            (AddressLevel::Upazila, self.upazila),
            (AddressLevel::Union, self.union),
            (AddressLevel::PostOffice, self.post_office),
            (AddressLevel::Village, self.village),
            (AddressLevel::Para, self.para),
        ]
        .into_iter()
        .filter_map(|(level, id)| id.map(|id| (level, id)))
        .collect()
    }
}

#[derive(Args, Debug, Clone)]
pub struct SubAccountArgs {
    /// Name, phone or email of the parent account (3+ characters)
    #[arg(long)]
    pub parent: String,
    /// Picks the match with this id instead of prompting
    #[arg(long)]
    pub parent_id: Option<String>,
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long)]
    pub name_bn: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub date_of_birth: NaiveDate,
    #[arg(long)]
    pub gender: Gender,
    #[arg(long)]
    pub blood_group: BloodGroup,
    #[arg(long)]
    pub guardian_nid: String,
    #[arg(long)]
    pub relationship: Relationship,
    #[arg(long)]
    pub photo: PathBuf,
    #[arg(long)]
    pub signature: PathBuf,
    #[command(flatten)]
    pub payment: PaymentArgs,
}
