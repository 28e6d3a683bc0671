use crate::infra::{build_service, parse_assignment, InMemoryScreeningService};
use chrono::Duration;
use clap::Args;
use disease_screen::config::AppConfig;
use disease_screen::error::AppError;
use disease_screen::screening::{
    BatchImporter, PredictionRecord, RawInput, ScreeningOutcome, ScreeningType, UserId,
    ValidationResult,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScreenArgs {
    /// Screening type: heart, diabetes, or pneumonia
    pub(crate) screening_type: ScreeningType,
    /// Field values as FIELD=VALUE, e.g. temperature=101.4
    #[arg(value_parser = parse_assignment, required = true)]
    pub(crate) fields: Vec<(String, String)>,
    /// Attribute the prediction to this user id
    #[arg(long)]
    pub(crate) user_id: Option<i64>,
    /// Print the stored record as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// Screening type applied to every row
    pub(crate) screening_type: ScreeningType,
    /// CSV file whose header row names the form fields
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Also print every stored record as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

/// Tally of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) rows: usize,
    pub(crate) scored: usize,
    pub(crate) rejected: usize,
    pub(crate) positive: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &ScreeningOutcome) {
        self.rows += 1;
        match outcome {
            ScreeningOutcome::Scored(record) => {
                self.scored += 1;
                if record.result.prediction {
                    self.positive += 1;
                }
            }
            ScreeningOutcome::Rejected(_) => self.rejected += 1,
        }
    }
}

fn load_service() -> Result<Arc<InMemoryScreeningService>, AppError> {
    let config = AppConfig::load()?;
    let (service, _) = build_service(&config.models)?;
    Ok(service)
}

pub(crate) fn run_screen(args: ScreenArgs) -> Result<(), AppError> {
    let ScreenArgs {
        screening_type,
        fields,
        user_id,
        json,
    } = args;

    let service = load_service()?;
    let input: RawInput = fields.into_iter().collect();
    let outcome = service.screen(screening_type, &input, user_id.map(UserId))?;

    match &outcome {
        ScreeningOutcome::Scored(record) if json => print_json(record),
        ScreeningOutcome::Scored(record) => render_record(record),
        ScreeningOutcome::Rejected(result) if json => print_json(&serde_json::json!({
            "errors": result.errors(),
            "cleaned": result.cleaned(),
        })),
        ScreeningOutcome::Rejected(result) => render_rejection(screening_type, result),
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let BatchArgs {
        screening_type,
        csv,
    } = args;

    let rows = BatchImporter::from_path(&csv)?;
    let service = load_service()?;
    let summary = screen_rows(&service, screening_type, &rows, |index, outcome| {
        print!("Row {}: ", index + 1);
        match outcome {
            ScreeningOutcome::Scored(record) => println!("{}", headline(record)),
            ScreeningOutcome::Rejected(result) => println!("{}", rejection_line(result)),
        }
    })?;

    println!(
        "\n{} {} rows from {}: {} scored ({} positive), {} rejected",
        summary.rows,
        screening_type.label(),
        csv.display(),
        summary.scored,
        summary.positive,
        summary.rejected
    );

    Ok(())
}

pub(crate) fn screen_rows(
    service: &InMemoryScreeningService,
    screening_type: ScreeningType,
    rows: &[RawInput],
    mut on_outcome: impl FnMut(usize, &ScreeningOutcome),
) -> Result<BatchSummary, AppError> {
    let mut summary = BatchSummary::default();
    for (index, row) in rows.iter().enumerate() {
        let outcome = service.screen(screening_type, row, None)?;
        on_outcome(index, &outcome);
        summary.record(&outcome);
    }
    Ok(summary)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service = load_service()?;
    let patient = UserId(1);

    println!("Disease risk screening demo");
    for (screening_type, input) in sample_submissions() {
        println!("\n{} screening", screening_type.label());
        match service.screen(screening_type, &input, Some(patient))? {
            ScreeningOutcome::Scored(record) => render_record(&record),
            ScreeningOutcome::Rejected(result) => render_rejection(screening_type, &result),
        }
    }

    println!("\nIncomplete submission");
    let mut incomplete = sample_submissions()
        .into_iter()
        .next()
        .map(|(_, input)| input)
        .unwrap_or_default();
    incomplete.insert("sex", "2");
    incomplete.remove("chol");
    match service.screen(ScreeningType::Heart, &incomplete, Some(patient))? {
        ScreeningOutcome::Scored(record) => render_record(&record),
        ScreeningOutcome::Rejected(result) => render_rejection(ScreeningType::Heart, &result),
    }

    let history = service.history(patient)?;
    println!("\nStored history for user {} (newest first)", patient);
    for record in &history {
        println!("- #{} {}", record.id, headline(record));
        if args.json {
            print_json(record);
        }
    }

    let overview = service.overview(Duration::hours(24))?;
    println!(
        "\nAdmin overview: {} predictions, {} in the last {} hours",
        overview.total, overview.recent, overview.window_hours
    );

    Ok(())
}

pub(crate) fn sample_submissions() -> Vec<(ScreeningType, RawInput)> {
    vec![
        (
            ScreeningType::Heart,
            [
                ("age", "63"),
                ("sex", "1"),
                ("cp", "3"),
                ("trestbps", "145"),
                ("chol", "233"),
                ("fbs", "1"),
                ("restecg", "0"),
                ("thalach", "150"),
                ("exang", "0"),
                ("oldpeak", "2.3"),
                ("slope", "0"),
                ("ca", "0"),
                ("thal", "1"),
            ]
            .into_iter()
            .collect(),
        ),
        (
            ScreeningType::Diabetes,
            [
                ("pregnancies", "1"),
                ("glucose", "89"),
                ("blood_pressure", "66"),
                ("skin_thickness", "23"),
                ("insulin", "94"),
                ("bmi", "28.1"),
                ("diabetes_pedigree", "0.167"),
                ("age", "21"),
            ]
            .into_iter()
            .collect(),
        ),
        (
            ScreeningType::Pneumonia,
            [
                ("temperature", "100.9"),
                ("cough_severity", "3"),
                ("breathing_difficulty", "1"),
                ("oxygen_level", "94"),
            ]
            .into_iter()
            .collect(),
        ),
    ]
}

fn headline(record: &PredictionRecord) -> String {
    let verdict = if record.result.prediction {
        "positive"
    } else {
        "negative"
    };
    format!(
        "{} {} | probability {:.1}% | {} risk",
        record.screening_type.label(),
        verdict,
        record.result.probability * 100.0,
        record.result.risk_level
    )
}

fn rejection_line(result: &ValidationResult) -> String {
    let errors: Vec<String> = result
        .errors()
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect();
    format!("rejected ({})", errors.join("; "))
}

fn render_record(record: &PredictionRecord) {
    println!("- Stored prediction #{} at {}", record.id, record.created_at);
    println!("  {}", headline(record));
    println!("  About: {}", record.result.info.description);
    println!("  Prevention:");
    for tip in &record.result.info.prevention {
        println!("    - {tip}");
    }
}

fn render_rejection(screening_type: ScreeningType, result: &ValidationResult) {
    println!(
        "- {} submission rejected: {} field(s) need attention, {} accepted",
        screening_type.label(),
        result.errors().len(),
        result.cleaned().len()
    );
    for (field, message) in result.errors() {
        println!("    - {field}: {message}");
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("  JSON payload unavailable: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use disease_screen::config::ModelConfig;
    use disease_screen::screening::validation::validate;

    #[test]
    fn sample_submissions_are_valid() {
        for (screening_type, input) in sample_submissions() {
            let result = validate(screening_type, &input);
            assert!(result.is_valid(), "{screening_type}: {:?}", result.errors());
        }
    }

    #[test]
    fn batch_summary_counts_each_outcome() {
        let (service, archive) = build_service(&ModelConfig::default()).expect("service builds");
        let rows: Vec<RawInput> = vec![
            [
                ("temperature", "101.4"),
                ("cough_severity", "5"),
                ("breathing_difficulty", "4"),
                ("oxygen_level", "90"),
            ]
            .into_iter()
            .collect(),
            [
                ("temperature", "98.6"),
                ("cough_severity", "0"),
                ("breathing_difficulty", "0"),
                ("oxygen_level", "98"),
            ]
            .into_iter()
            .collect(),
            [("temperature", "hot")].into_iter().collect(),
        ];

        let mut seen = Vec::new();
        let summary = screen_rows(&service, ScreeningType::Pneumonia, &rows, |index, _| {
            seen.push(index)
        })
        .expect("batch runs");

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(
            summary,
            BatchSummary {
                rows: 3,
                scored: 2,
                rejected: 1,
                positive: 1,
            }
        );
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn rejection_line_lists_each_field() {
        let input: RawInput = [("temperature", "120")].into_iter().collect();
        let result = validate(ScreeningType::Pneumonia, &input);
        let line = rejection_line(&result);
        assert!(line.starts_with("rejected ("));
        assert!(line.contains("temperature: Temperature must be between 95 and 108°F"));
        assert!(line.contains("oxygen_level: Oxygen level must be a number"));
    }
}
