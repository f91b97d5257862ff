use crate::cli::commands::AddArgs;
use crate::errors::DeepScanError;
use crate::models::NewSubject;
use console::style;
use tokio_util::sync::CancellationToken;

pub async fn handle_add(args: AddArgs) -> Result<(), DeepScanError> {
    let trigger = super::open_trigger(&args.store, CancellationToken::new()).await?;
    let subject = trigger
        .register_subject(NewSubject {
            name: args.name.unwrap_or_default(),
            url: args.url,
            owner_email: args.email,
        })
        .await?;

    println!(
        "{} Registered {} ({})",
        style("✓").green(),
        style(&subject.name).bold(),
        subject.url,
    );
    println!("  id: {}", style(&subject.id).cyan());
    Ok(())
}
