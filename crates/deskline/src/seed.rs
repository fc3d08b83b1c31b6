// SPDX-FileCopyrightText: 2026 Deskline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `deskline seed` command implementation.
//!
//! Inserts three sample users and two to four sample tickets for each.
//! Seeding is skipped entirely once any user exists.

use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use strum::IntoEnumIterator;
use tracing::info;

use deskline_config::DesklineConfig;
use deskline_core::types::{ActiveStatus, TicketStatus};
use deskline_core::{DesklineError, StorageAdapter};
use deskline_identity::{BalanceInput, SharedKeyVerifier, UserFields, UserResolver};
use deskline_storage::SqliteStorage;
use deskline_tickets::{TicketFields, TicketManager, UserRef};

const SAMPLE_PASSWORD: &str = "password";
const SAMPLE_DESCRIPTION: &str =
    "This is a sample ticket description for testing purposes. This ticket was automatically generated.";

struct SampleUser {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    balance: f64,
    payment_status: &'static str,
    active_status: ActiveStatus,
}

const SAMPLE_USERS: [SampleUser; 3] = [
    SampleUser {
        name: "John Doe",
        email: "john@example.com",
        phone: "1234567890",
        balance: 100.0,
        payment_status: "paid",
        active_status: ActiveStatus::Active,
    },
    SampleUser {
        name: "Jane Smith",
        email: "jane@example.com",
        phone: "9876543210",
        balance: 50.0,
        payment_status: "pending",
        active_status: ActiveStatus::Active,
    },
    SampleUser {
        name: "Bob Johnson",
        email: "bob@example.com",
        phone: "5551234567",
        balance: 0.0,
        payment_status: "unpaid",
        active_status: ActiveStatus::Inactive,
    },
];

/// What a seeding run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { users: usize, tickets: usize },
    /// The database already had users.
    Skipped { existing: usize },
}

/// Runs the `deskline seed` command.
pub async fn run_seed(config: DesklineConfig) -> Result<(), DesklineError> {
    crate::serve::init_tracing(&config.server.log_level);

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let verifier = Arc::new(SharedKeyVerifier::from_config(&config.identity));
    let resolver = UserResolver::new(storage.clone(), verifier, &config.identity)?;
    let tickets = TicketManager::new(storage.clone(), &config.tickets);

    let plan = plan_tickets(&mut rand::thread_rng());
    let outcome = seed_database(&resolver, &tickets, &plan).await;
    storage.close().await?;

    match outcome? {
        SeedOutcome::Seeded { users, tickets } => {
            println!("deskline: seeded {users} users and {tickets} tickets");
        }
        SeedOutcome::Skipped { existing } => {
            println!("deskline: database already has {existing} users, nothing seeded");
        }
    }
    Ok(())
}

/// Pick a ticket count (2 to 4) and a status per ticket for each sample user.
pub fn plan_tickets<R: Rng>(rng: &mut R) -> Vec<Vec<TicketStatus>> {
    let statuses: Vec<TicketStatus> = TicketStatus::iter().collect();
    SAMPLE_USERS
        .iter()
        .map(|_| {
            let count = rng.gen_range(2..=4);
            (0..count)
                .map(|_| statuses.choose(rng).copied().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Insert the sample users and the planned tickets.
pub async fn seed_database(
    resolver: &UserResolver,
    tickets: &TicketManager,
    plan: &[Vec<TicketStatus>],
) -> Result<SeedOutcome, DesklineError> {
    let existing = resolver.list().await?.len();
    if existing > 0 {
        info!(existing, "users present, skipping seed");
        return Ok(SeedOutcome::Skipped { existing });
    }

    let mut ticket_count = 0;
    for (sample, statuses) in SAMPLE_USERS.iter().zip(plan) {
        let user = resolver
            .create(&UserFields {
                name: Some(sample.name.to_string()),
                email: Some(sample.email.to_string()),
                phone_number: Some(sample.phone.to_string()),
                password: Some(SAMPLE_PASSWORD.to_string()),
                balance: Some(BalanceInput::Number(sample.balance)),
                payment_status: Some(sample.payment_status.to_string()),
                active_status: Some(sample.active_status),
                ..UserFields::default()
            })
            .await?;

        for (i, status) in statuses.iter().enumerate() {
            let fields = TicketFields {
                title: Some(format!("Sample Ticket {}", i + 1)),
                description: Some(SAMPLE_DESCRIPTION.to_string()),
                status: None,
            };
            let ticket = tickets.create(UserRef::Id(user.id), &fields).await?;
            if *status != TicketStatus::Open {
                tickets.update_status(ticket.id, status.as_ref()).await?;
            }
            ticket_count += 1;
        }
    }

    info!(users = SAMPLE_USERS.len(), tickets = ticket_count, "sample data seeded");
    Ok(SeedOutcome::Seeded {
        users: SAMPLE_USERS.len(),
        tickets: ticket_count,
    })
}
