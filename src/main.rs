use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use birthday_book::{
    api::{self, AuthApi, BirthdayApi, HttpApi},
    columns,
    config::Config,
    logging,
    models::{Credentials, Registration},
    store::Store,
    table::DataTable,
    tui,
    validation::{validate_credentials, validate_registration, BirthdayForm},
};

mod cli;

use cli::{Cli, Commands, PhotoCommands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so it only logs to the file
    if matches!(cli.command, Commands::Tui) {
        logging::init_tui()?;
    } else {
        logging::init_cli();
    }

    let mut config = Config::from_env()?;
    if let Some(api_url) = cli.api_url.clone() {
        config.api_url = api_url;
    }
    if let Some(token) = cli.token.clone() {
        config.token = Some(token);
    }
    config.validate()?;

    if let Err(e) = run(cli.command, config).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(command: Commands, config: Config) -> Result<()> {
    let http = HttpApi::new(&config).context("Failed to build HTTP client")?;
    let is_admin = http.session().is_admin();

    match command {
        Commands::Login { email, password } => {
            let credentials = Credentials { email, password };
            validate_credentials(&credentials)?;

            let response = http.login(&credentials).await.map_err(user_facing)?;
            info!("Logged in as {}", credentials.email);
            println!("Login successful ({})", response.role.as_str());
            println!("export BIRTHDAY_BOOK_TOKEN={}", response.token);
            println!("export BIRTHDAY_BOOK_ROLE={}", response.role.as_str());
        }

        Commands::Register {
            name,
            email,
            password,
        } => {
            let registration = Registration {
                name,
                email,
                password,
            };
            validate_registration(&registration)?;

            http.register(&registration).await.map_err(user_facing)?;
            println!("Registration successful. You can now log in.");
        }

        Commands::Me => {
            let mut store = Store::new(Arc::new(http));
            store.fetch_current_user().await?;
            if let Some(user) = store.current_user() {
                println!("{} <{}> ({})", user.name, user.email, user.role.as_str());
            }
        }

        Commands::List {
            search,
            page,
            rows,
            wishes,
        } => {
            let mut store = Store::new(Arc::new(http));
            store.fetch_birthdays().await?;

            let columns = if wishes {
                columns::wish_columns(false)
            } else {
                columns::birthday_columns(is_admin, false)
            };
            let mut table = DataTable::new(columns)
                .with_rows_per_page_options(&config.rows_per_page_options);
            if let Some(rows) = rows {
                table.set_rows_per_page(rows);
            }
            if let Some(search) = search {
                table.set_search(&search);
            }
            table.set_page(page.saturating_sub(1));

            println!("{}", table.view(store.birthdays().items()).to_plain_text());
        }

        Commands::Add {
            name,
            gender,
            relationship,
            contact,
            dob,
            email,
        } => {
            let form = BirthdayForm {
                name,
                gender: Commands::parse_gender(&gender)?.as_str().to_string(),
                relationship: Commands::parse_relationship(&relationship)?
                    .as_str()
                    .to_string(),
                contact,
                dob,
                email,
            };
            let payload = form.parse(Local::now().date_naive())?;

            let mut store = Store::new(Arc::new(http));
            let created = store.create_birthday(payload).await?;
            info!("Created birthday {}", created.id);
            println!("Birthday added: {} ({})", created.name, created.id);
        }

        Commands::Update {
            id,
            name,
            gender,
            relationship,
            contact,
            dob,
            email,
        } => {
            let mut store = Store::new(Arc::new(http));
            store.fetch_birthdays().await?;

            // start from the stored values so the full form validates
            let mut form = store
                .birthdays()
                .get(&id)
                .map(BirthdayForm::from_birthday)
                .with_context(|| format!("No birthday with id {}", id))?;
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(gender) = gender {
                form.gender = Commands::parse_gender(&gender)?.as_str().to_string();
            }
            if let Some(relationship) = relationship {
                form.relationship = Commands::parse_relationship(&relationship)?
                    .as_str()
                    .to_string();
            }
            if let Some(contact) = contact {
                form.contact = contact;
            }
            if let Some(dob) = dob {
                form.dob = dob;
            }
            if let Some(email) = email {
                form.email = email;
            }

            let patch = form.parse(Local::now().date_naive())?.into_patch();
            let updated = store.update_birthday(&id, patch).await?;
            println!("Birthday updated: {} ({})", updated.name, updated.id);
        }

        Commands::Delete { id } => {
            let mut store = Store::new(Arc::new(http));
            store.delete_birthday(&id).await?;
            println!("Birthday deleted: {}", id);
        }

        Commands::Wish { id, text } => {
            if text.trim().is_empty() {
                anyhow::bail!("Wish text is required");
            }
            let mut store = Store::new(Arc::new(http));
            let updated = store.update_wish(&id, text.trim()).await?;
            println!("Wish saved for {}", updated.name);
        }

        Commands::Photo { action } => match action {
            PhotoCommands::Upload { id, path } => {
                let mut store = Store::new(Arc::new(http));
                let updated = store.upload_photo(&id, path).await?;
                println!("Photo uploaded. {} now has {} photo(s)", updated.name, updated.photos);
            }
            PhotoCommands::Get { id, index, output } => {
                let indices = match index {
                    Some(index) => vec![index],
                    None => {
                        let mut store = Store::new(Arc::new(http.clone()));
                        store.fetch_birthdays().await?;
                        let record = store
                            .birthdays()
                            .get(&id)
                            .with_context(|| format!("No birthday with id {}", id))?;
                        (0..record.photos).collect()
                    }
                };
                if indices.is_empty() {
                    println!("No photos stored for {}", id);
                    return Ok(());
                }

                let dir = output.unwrap_or_else(|| config.photo_dir.clone());
                let written = api::save_photos(&http, &id, &indices, &dir)
                    .await
                    .map_err(user_facing)?;
                for path in written {
                    println!("{}", path.display());
                }
            }
        },

        Commands::Users => {
            let mut store = Store::new(Arc::new(http));
            store.fetch_users().await?;
            let table = DataTable::new(columns::user_columns())
                .with_rows_per_page_options(&[store.users().items().len().max(1)]);
            println!("{}", table.view(store.users().items()).to_plain_text());
        }

        Commands::Stats => {
            let users = http.user_count().await.map_err(user_facing)?;
            let mut store = Store::new(Arc::new(http));
            store.fetch_birthdays().await?;
            println!("Total users:     {}", users);
            println!("Total birthdays: {}", store.birthdays().items().len());
        }

        Commands::Tui => {
            info!("Launching TUI interface");
            tui::run(config).await?;
            info!("TUI exited successfully");
        }
    }

    Ok(())
}

/// Direct API calls bypass the store; give them the same message treatment
fn user_facing(err: api::ApiError) -> anyhow::Error {
    error!("{}", err);
    anyhow::anyhow!(err.user_message())
}
