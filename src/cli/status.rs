use console::style;
use tokio_util::sync::CancellationToken;

use crate::cli::commands::StatusArgs;
use crate::errors::DeepScanError;
use crate::models::SubjectStatus;

pub async fn handle_status(args: StatusArgs) -> Result<(), DeepScanError> {
    let trigger = super::open_trigger(&args.store, CancellationToken::new()).await?;

    let Some(subject_id) = args.subject_id else {
        let subjects = trigger.list_subjects().await?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&subjects)?);
            return Ok(());
        }
        if subjects.is_empty() {
            println!("No subjects registered");
        }
        for subject in subjects {
            println!(
                "{}  {:<10} {}",
                style(&subject.id).cyan(),
                styled_status(subject.status),
                subject.url,
            );
        }
        return Ok(());
    };

    let status = trigger.get_scan_status(&subject_id).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Subject:   {}", style(&status.subject_id).cyan());
    println!("Status:    {}", styled_status(status.status));
    if let Some(progress) = &status.stored_progress {
        println!("Progress:  {}", progress);
    }
    match status.last_scan_at {
        Some(at) => println!("Last scan: {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("Last scan: never"),
    }
    if let Some(score) = status.latest_score {
        println!("Score:     {}/100", score);
    }
    if let Some(count) = status.latest_finding_count {
        println!("Findings:  {}", count);
    }
    Ok(())
}

fn styled_status(status: SubjectStatus) -> console::StyledObject<&'static str> {
    let text = status.as_str();
    match status {
        SubjectStatus::Scanned => style(text).green(),
        SubjectStatus::Scanning => style(text).yellow(),
        SubjectStatus::Down => style(text).red(),
        _ => style(text).dim(),
    }
}
