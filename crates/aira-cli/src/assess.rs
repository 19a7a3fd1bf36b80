//! # Offline assessment commands
//!
//! `classify`, `report` and `validate` work on a local answers file and
//! never touch the network.
//!
//! ## Exit codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Validation errors, or the answers cannot be classified |

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use aira_classifier::{classify, ClassificationError, ClassificationInput, ClassificationResult, ComplianceReport};
use aira_core::{normalize_flat, normalize_step, AnswerSet, StepIndex, SystemId, Timestamp};
use aira_wizard::{validate_all, validate_step, FieldErrors};

use crate::answers::{load_answers, write_output};

/// Arguments for `aira classify`.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Flattened answers file (JSON or YAML, `-` for stdin).
    pub answers: PathBuf,

    /// Write the result here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for `aira report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Flattened answers file (JSON or YAML, `-` for stdin).
    pub answers: PathBuf,

    /// System the report is issued for.
    #[arg(long)]
    pub system_id: SystemId,

    /// Report date as RFC 3339 (default: now). Milestones are dated from it.
    #[arg(long)]
    pub date: Option<String>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Arguments for `aira validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Flattened answers file (JSON or YAML, `-` for stdin).
    pub answers: PathBuf,

    /// Validate only this step (1-10).
    #[arg(long, value_parser = parse_step)]
    pub step: Option<StepIndex>,
}

/// Parse a step number for clap.
pub fn parse_step(s: &str) -> std::result::Result<StepIndex, String> {
    let n: i64 = s.trim().parse().map_err(|_| format!("{s:?} is not a step number"))?;
    StepIndex::new(n).map_err(|e| e.to_string())
}

/// Execute `aira classify`.
pub fn run_classify(args: &ClassifyArgs) -> Result<u8> {
    let answers = normalize_flat(&load_answers(&args.answers)?);
    let Some(result) = classify_or_report(&answers)? else {
        return Ok(1);
    };
    write_output(&result, args.out.as_deref())?;
    Ok(0)
}

/// Execute `aira report`.
pub fn run_report(args: &ReportArgs) -> Result<u8> {
    let report_date = match &args.date {
        Some(raw) => Timestamp::parse(raw).with_context(|| format!("invalid --date {raw:?}"))?,
        None => Timestamp::now(),
    };
    let answers = normalize_flat(&load_answers(&args.answers)?);
    let Some(result) = classify_or_report(&answers)? else {
        return Ok(1);
    };
    let report = ComplianceReport::build(args.system_id, &result, Some(&answers), report_date)?;
    write_output(&report, args.out.as_deref())?;
    Ok(0)
}

/// Execute `aira validate`.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let raw = load_answers(&args.answers)?;
    let failures: BTreeMap<StepIndex, FieldErrors> = match args.step {
        Some(step) => {
            let errors = validate_step(step, &normalize_step(step, &raw));
            if errors.is_empty() {
                BTreeMap::new()
            } else {
                BTreeMap::from([(step, errors)])
            }
        }
        None => validate_all(&normalize_flat(&raw)),
    };

    if failures.is_empty() {
        println!("OK: {}", scope(args.step));
        return Ok(0);
    }
    print_failures(&failures);
    Ok(1)
}

/// Classify, printing the missing answers when the assessment is incomplete.
fn classify_or_report(answers: &AnswerSet) -> Result<Option<ClassificationResult>> {
    let input = ClassificationInput::from_answers(answers)?;
    match classify(&input, Timestamp::now()) {
        Ok(result) => Ok(Some(result)),
        Err(ClassificationError::Incomplete {
            missing_fields,
            missing_steps,
        }) => {
            let steps: Vec<String> = missing_steps.iter().map(|s| s.to_string()).collect();
            eprintln!("cannot classify yet: complete step(s) {}", steps.join(", "));
            for field in &missing_fields {
                eprintln!("  missing: {field}");
            }
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn print_failures(failures: &BTreeMap<StepIndex, FieldErrors>) {
    let count: usize = failures.values().map(BTreeMap::len).sum();
    for (step, errors) in failures {
        eprintln!("step {step}:");
        for (field, message) in errors {
            eprintln!("  {field}: {message}");
        }
    }
    eprintln!("{count} error(s) in {} step(s)", failures.len());
}

fn scope(step: Option<StepIndex>) -> String {
    match step {
        Some(s) => format!("step {s} is valid"),
        None => "all steps are valid".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::path::Path;

    fn write_answers(dir: &Path, name: &str, value: Value) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, serde_json::to_string(&value).unwrap()).unwrap();
        path
    }

    fn negative_screen() -> Value {
        json!({
            "subliminal_manipulation": false,
            "vulnerability_exploitation": false,
            "social_scoring": false,
            "realtime_biometric_identification": false,
            "biometric_categorization": false, "critical_infrastructure": false,
            "education": false, "employment_hr": true, "essential_services": false,
            "law_enforcement": false, "migration_asylum": false,
            "justice_democracy": false, "profiling": false,
            "preparatory_only": false,
            "ai_regulated_product": "no",
            "automated_decision_legal_effect": "no",
            "human_oversight_model": "human_in_command",
            "potential_impact": "minor_suggestions"
        })
    }

    #[test]
    fn parse_step_accepts_only_catalog_steps() {
        assert_eq!(parse_step("4").unwrap().get(), 4);
        assert!(parse_step("0").is_err());
        assert!(parse_step("11").is_err());
        assert!(parse_step("four").is_err());
    }

    #[test]
    fn classify_writes_result() {
        let dir = tempfile::tempdir().unwrap();
        let answers = write_answers(dir.path(), "answers.json", negative_screen());
        let out = dir.path().join("result.json");
        let code = run_classify(&ClassifyArgs { answers, out: Some(out.clone()) }).unwrap();
        assert_eq!(code, 0);
        let result: Value = serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(result["risk_tier"], "high");
    }

    #[test]
    fn classify_incomplete_exits_one() {
        let dir = tempfile::tempdir().unwrap();
        let answers = write_answers(dir.path(), "answers.json", json!({}));
        let code = run_classify(&ClassifyArgs { answers, out: None }).unwrap();
        assert_eq!(code, 1);
    }

    #[test]
    fn report_is_dated_from_given_date() {
        let dir = tempfile::tempdir().unwrap();
        let answers = write_answers(dir.path(), "answers.json", negative_screen());
        let out = dir.path().join("report.json");
        let args = ReportArgs {
            answers,
            system_id: SystemId::new(),
            date: Some("2026-01-31T09:00:00Z".into()),
            out: Some(out.clone()),
        };
        assert_eq!(run_report(&args).unwrap(), 0);
        let report: Value = serde_json::from_str(&std::fs::read_to_string(out).unwrap()).unwrap();
        assert_eq!(report["report_date"], "2026-01-31");
        assert!(report["compliance_requirements"].as_array().unwrap().len() >= 10);
    }

    #[test]
    fn report_rejects_bad_date() {
        let dir = tempfile::tempdir().unwrap();
        let answers = write_answers(dir.path(), "answers.json", negative_screen());
        let args = ReportArgs {
            answers,
            system_id: SystemId::new(),
            date: Some("yesterday".into()),
            out: None,
        };
        assert!(run_report(&args).is_err());
    }

    #[test]
    fn validate_single_step() {
        let dir = tempfile::tempdir().unwrap();
        let answers = write_answers(
            dir.path(),
            "answers.json",
            json!({"subliminal_manipulation": true, "vulnerability_exploitation": false,
                   "social_scoring": false, "realtime_biometric_identification": false}),
        );
        let args = ValidateArgs { answers: answers.clone(), step: Some(parse_step("4").unwrap()) };
        assert_eq!(run_validate(&args).unwrap(), 1);

        let fixed = write_answers(
            dir.path(),
            "fixed.json",
            json!({"subliminal_manipulation": true, "manipulation_details": "Dark patterns at checkout",
                   "vulnerability_exploitation": false, "social_scoring": false,
                   "realtime_biometric_identification": false}),
        );
        let args = ValidateArgs { answers: fixed, step: Some(parse_step("4").unwrap()) };
        assert_eq!(run_validate(&args).unwrap(), 0);
    }

    #[test]
    fn validate_all_reports_unanswered_steps() {
        let dir = tempfile::tempdir().unwrap();
        let answers = write_answers(dir.path(), "answers.json", negative_screen());
        assert_eq!(run_validate(&ValidateArgs { answers, step: None }).unwrap(), 1);
    }
}
