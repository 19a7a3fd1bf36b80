//! # Step Catalog
//!
//! The immutable, build-time description of the ten assessment steps: which
//! fields each step owns, their kinds, option lists, minimum lengths and
//! visibility gates. Validators, the normalizer and the classifier all read
//! from this one table; nothing mutates it at runtime.
//!
//! Field names are unique across the whole catalog, so a flattened answer
//! record can always be mapped back to its owning step with [`owning_step`].
//!
//! ## Gates
//!
//! A [`Gate`] is a visibility predicate over the answers of the same step.
//! A field whose gate is closed is hidden, and a hidden field is never
//! required. Detail texts for prohibited practices, the preparatory-only
//! exemption and the safety-product sub-questions are all gated.

use crate::answer::{AnswerRecord, NONE_SENTINEL};
use crate::step::StepIndex;
use crate::taxonomy::{ImpactLevel, OversightModel, Tristate};

/// Steps that must be complete before a classification may be requested.
pub const CLASSIFICATION_STEPS: [StepIndex; 4] = [
    StepIndex::from_catalog(4),
    StepIndex::from_catalog(5),
    StepIndex::from_catalog(6),
    StepIndex::from_catalog(7),
];

/// Kind of a catalog field and the constraints that come with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Yes/no toggle.
    Bool,
    /// Exactly one of the listed options.
    Choice(&'static [&'static str]),
    /// Free text; when required, at least `min_len` characters after trimming.
    Text { min_len: usize },
    /// Multi-select over `options`. With `none_sentinel`, the `"none"`
    /// option is mutually exclusive with every other option.
    Set {
        options: &'static [&'static str],
        none_sentinel: bool,
    },
}

/// Visibility predicate evaluated against the answers of the owning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    /// Visible when the named boolean is `true`.
    WhenTrue(&'static str),
    /// Visible when the named choice equals the given option.
    WhenEquals(&'static str, &'static str),
    /// Visible when any of the named booleans is `true`.
    WhenAnyTrue(&'static [&'static str]),
}

impl Gate {
    /// Whether the gated field is visible given `record`.
    pub fn is_open(&self, record: &AnswerRecord) -> bool {
        match self {
            Gate::Always => true,
            Gate::WhenTrue(field) => record.bool(field) == Some(true),
            Gate::WhenEquals(field, option) => record.text(field) == Some(*option),
            Gate::WhenAnyTrue(fields) => fields.iter().any(|f| record.bool(f) == Some(true)),
        }
    }
}

/// One field of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Required whenever the gate is open.
    pub required: bool,
    pub gate: Gate,
}

impl FieldSpec {
    const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: true, gate: Gate::Always }
    }

    const fn optional(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { name, label, kind, required: false, gate: Gate::Always }
    }

    const fn gated(name: &'static str, label: &'static str, kind: FieldKind, gate: Gate) -> Self {
        Self { name, label, kind, required: true, gate }
    }

    /// Whether the field must be answered given the other answers of its step.
    pub fn is_required_in(&self, record: &AnswerRecord) -> bool {
        self.required && self.gate.is_open(record)
    }

    /// Whether `option` is acceptable for a choice or set field.
    pub fn accepts_option(&self, option: &str) -> bool {
        match self.kind {
            FieldKind::Choice(options) => options.contains(&option),
            FieldKind::Set { options, none_sentinel } => {
                options.contains(&option) || (none_sentinel && option == NONE_SENTINEL)
            }
            FieldKind::Bool | FieldKind::Text { .. } => false,
        }
    }
}

/// One wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDefinition {
    pub index: StepIndex,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

impl StepDefinition {
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// ─── Option lists ───────────────────────────────────────────────────────

const YES_NO: &[&str] = &["yes", "no"];
const YES_IN_PROGRESS_NO: &[&str] = &["yes", "in_progress", "no"];

const DEVELOPMENT_STAGES: &[&str] = &["planning", "development", "testing", "deployed", "retired"];
const DEPLOYMENT_TIMELINES: &[&str] = &[
    "within_3_months",
    "within_6_months",
    "within_12_months",
    "over_12_months",
    "already_deployed",
];
const PRIMARY_PURPOSES: &[&str] = &[
    "employment",
    "biometric",
    "education",
    "healthcare",
    "infrastructure",
    "law_enforcement",
    "financial",
    "customer",
    "content",
    "automation",
    "analytics",
    "other",
];
const TARGET_USERS: &[&str] = &[
    "general_public",
    "employees",
    "customers",
    "students",
    "patients",
    "government",
    "children",
    "vulnerable_groups",
];
const MODEL_TYPES: &[&str] = &["machine_learning", "rule_based", "hybrid", "generative"];
const MODEL_ARCHITECTURES: &[&str] = &[
    "neural_network",
    "transformer",
    "decision_tree",
    "ensemble",
    "llm",
    "cnn",
    "rnn_lstm",
    "svm",
    "other",
];
const PROCESSING_TYPES: &[&str] = &["real_time", "batch", "both"];
const INPUT_DATA_TYPES: &[&str] = &[
    "text",
    "images",
    "audio",
    "video",
    "biometric",
    "behavioral",
    "financial",
    "location",
    "health",
];
const OUTPUT_TYPES: &[&str] = &[
    "predictions",
    "classifications",
    "recommendations",
    "generated_content",
    "decisions",
    "scores",
];
const DECISION_AUTONOMY: &[&str] = &["fully_automated", "human_oversight", "human_approval"];

/// Step-5 category flags, in the order of `HighRiskCategory::all()`.
pub const CATEGORY_FIELDS: &[&str] = &[
    "biometric_categorization",
    "critical_infrastructure",
    "education",
    "employment_hr",
    "essential_services",
    "law_enforcement",
    "migration_asylum",
    "justice_democracy",
    "profiling",
];

const SAFETY_SECTORS: &[&str] = &[
    "medical_devices",
    "machinery",
    "automotive",
    "aviation",
    "industrial_robots",
    "other",
];
const LEGISLATION: &[&str] = &[
    "mdr",
    "machinery_directive",
    "general_product_safety",
    "aviation_regulation",
    "other",
];
const VULNERABLE_GROUPS: &[&str] = &["children", "elderly", "disabled"];
const REVIEW_FREQUENCY: &[&str] = &["real_time", "periodically", "rarely", "never"];
const DATA_SOURCES: &[&str] = &[
    "internal_dbs",
    "public_datasets",
    "third_party",
    "user_generated",
    "sensors",
    "web_scraping",
    "other",
];
const PERSONAL_DATA: &[&str] = &["no", "minimal", "standard", "sensitive"];
const GDPR_STATUS: &[&str] = &["fully_compliant", "partially_compliant", "not_compliant", "unknown"];
const TRANSPARENCY_LEVELS: &[&str] = &["minimal", "medium", "high"];
const EXPLANATION_CAPABILITY: &[&str] = &["yes", "partially", "no"];
const USER_DOCUMENTATION: &[&str] = &[
    "user_manual",
    "technical_explanation",
    "contact_support",
    "privacy_notice",
    "faq",
];
const DOCUMENTATION_STATUS: &[&str] = &["complete", "partial", "not_started"];
const MONITORING_STATUS: &[&str] = &["yes", "planned", "no"];

const fn text(min_len: usize) -> FieldKind {
    FieldKind::Text { min_len }
}

const fn set(options: &'static [&'static str]) -> FieldKind {
    FieldKind::Set { options, none_sentinel: false }
}

const fn set_with_none(options: &'static [&'static str]) -> FieldKind {
    FieldKind::Set { options, none_sentinel: true }
}

// ─── Steps ──────────────────────────────────────────────────────────────

const STEP_1: &[FieldSpec] = &[
    FieldSpec::required("system_name", "System name", text(3)),
    FieldSpec::required("system_description", "System description", text(10)),
    FieldSpec::required("development_stage", "Development stage", FieldKind::Choice(DEVELOPMENT_STAGES)),
    FieldSpec::optional("system_version", "System version", text(0)),
    FieldSpec::required(
        "planned_deployment_timeline",
        "Planned deployment timeline",
        FieldKind::Choice(DEPLOYMENT_TIMELINES),
    ),
];

const STEP_2: &[FieldSpec] = &[
    FieldSpec::required("primary_purpose", "Primary purpose", FieldKind::Choice(PRIMARY_PURPOSES)),
    FieldSpec::required("purpose_details", "Purpose details", text(20)),
    FieldSpec::required("target_users", "Target users", set(TARGET_USERS)),
];

const STEP_3: &[FieldSpec] = &[
    FieldSpec::required("ai_model_type", "AI model type", FieldKind::Choice(MODEL_TYPES)),
    FieldSpec::required("model_architecture", "Model architecture", FieldKind::Choice(MODEL_ARCHITECTURES)),
    FieldSpec::required("data_processing_type", "Data processing type", FieldKind::Choice(PROCESSING_TYPES)),
    FieldSpec::required("input_data_types", "Input data types", set(INPUT_DATA_TYPES)),
    FieldSpec::required("output_types", "Output types", set(OUTPUT_TYPES)),
    FieldSpec::required("decision_autonomy", "Decision autonomy", FieldKind::Choice(DECISION_AUTONOMY)),
];

const STEP_4: &[FieldSpec] = &[
    FieldSpec::required("subliminal_manipulation", "Subliminal manipulation", FieldKind::Bool),
    FieldSpec::gated(
        "manipulation_details",
        "Manipulation details",
        text(1),
        Gate::WhenTrue("subliminal_manipulation"),
    ),
    FieldSpec::required("vulnerability_exploitation", "Exploitation of vulnerabilities", FieldKind::Bool),
    FieldSpec::gated(
        "vulnerability_details",
        "Vulnerability exploitation details",
        text(1),
        Gate::WhenTrue("vulnerability_exploitation"),
    ),
    FieldSpec::required("social_scoring", "Social scoring", FieldKind::Bool),
    FieldSpec::gated(
        "social_scoring_details",
        "Social scoring details",
        text(1),
        Gate::WhenTrue("social_scoring"),
    ),
    FieldSpec::required(
        "realtime_biometric_identification",
        "Real-time remote biometric identification",
        FieldKind::Bool,
    ),
    FieldSpec::gated(
        "biometric_details",
        "Biometric identification details",
        text(1),
        Gate::WhenTrue("realtime_biometric_identification"),
    ),
];

const STEP_5: &[FieldSpec] = &[
    FieldSpec::required("biometric_categorization", "Biometric categorisation", FieldKind::Bool),
    FieldSpec::required("critical_infrastructure", "Critical infrastructure", FieldKind::Bool),
    FieldSpec::required("education", "Education and vocational training", FieldKind::Bool),
    FieldSpec::required("employment_hr", "Employment and HR", FieldKind::Bool),
    FieldSpec::required("essential_services", "Essential services", FieldKind::Bool),
    FieldSpec::required("law_enforcement", "Law enforcement", FieldKind::Bool),
    FieldSpec::required("migration_asylum", "Migration and asylum", FieldKind::Bool),
    FieldSpec::required("justice_democracy", "Justice and democracy", FieldKind::Bool),
    FieldSpec::required("profiling", "Profiling", FieldKind::Bool),
    FieldSpec::gated(
        "preparatory_only",
        "Preparatory or procedural tasks only",
        FieldKind::Bool,
        Gate::WhenAnyTrue(CATEGORY_FIELDS),
    ),
    FieldSpec::gated(
        "preparatory_justification",
        "Preparatory-only justification",
        text(20),
        Gate::WhenTrue("preparatory_only"),
    ),
];

const STEP_6: &[FieldSpec] = &[
    FieldSpec::required("ai_regulated_product", "Safety component of a regulated product", FieldKind::Choice(YES_NO)),
    FieldSpec::gated(
        "safety_sector",
        "Safety sector",
        FieldKind::Choice(SAFETY_SECTORS),
        Gate::WhenEquals("ai_regulated_product", "yes"),
    ),
    FieldSpec::gated(
        "third_party_conformity",
        "Third-party conformity assessment",
        FieldKind::Choice(Tristate::OPTIONS),
        Gate::WhenEquals("ai_regulated_product", "yes"),
    ),
    FieldSpec::gated(
        "ce_marking_required",
        "CE marking required",
        FieldKind::Choice(YES_NO),
        Gate::WhenEquals("ai_regulated_product", "yes"),
    ),
    FieldSpec::gated(
        "applicable_legislation",
        "Applicable legislation",
        set(LEGISLATION),
        Gate::WhenEquals("ai_regulated_product", "yes"),
    ),
];

const STEP_7: &[FieldSpec] = &[
    FieldSpec::required("people_affected_count", "People affected", text(1)),
    FieldSpec::required("vulnerable_groups", "Vulnerable groups", set_with_none(VULNERABLE_GROUPS)),
    FieldSpec::required("potential_impact", "Potential impact", FieldKind::Choice(ImpactLevel::OPTIONS)),
    FieldSpec::required(
        "human_oversight_model",
        "Human oversight model",
        FieldKind::Choice(OversightModel::OPTIONS),
    ),
    FieldSpec::required("humans_can_override", "Humans can override", FieldKind::Choice(YES_NO)),
    FieldSpec::required(
        "output_review_frequency",
        "Output review frequency",
        FieldKind::Choice(REVIEW_FREQUENCY),
    ),
    FieldSpec::required("fallback_human_contact", "Fallback human contact", FieldKind::Choice(YES_NO)),
    FieldSpec::required(
        "automated_decision_legal_effect",
        "Automated decisions with legal effect",
        FieldKind::Choice(Tristate::OPTIONS),
    ),
];

const STEP_8: &[FieldSpec] = &[
    FieldSpec::required("data_sources", "Data sources", set(DATA_SOURCES)),
    FieldSpec::required(
        "personal_data_processing",
        "Personal data processing",
        FieldKind::Choice(PERSONAL_DATA),
    ),
    FieldSpec::required("data_quality_measures", "Data quality measures", text(10)),
    FieldSpec::required("bias_mitigation_measures", "Bias mitigation measures", text(4)),
    FieldSpec::required(
        "data_governance_framework",
        "Data governance framework",
        FieldKind::Choice(YES_NO),
    ),
    FieldSpec::required("gdpr_compliance_status", "GDPR compliance status", FieldKind::Choice(GDPR_STATUS)),
];

const STEP_9: &[FieldSpec] = &[
    FieldSpec::required(
        "user_notification_mechanism",
        "User notification mechanism",
        FieldKind::Choice(YES_NO),
    ),
    FieldSpec::required("transparency_level", "Transparency level", FieldKind::Choice(TRANSPARENCY_LEVELS)),
    FieldSpec::required(
        "decision_explanation_capability",
        "Decision explanation capability",
        FieldKind::Choice(EXPLANATION_CAPABILITY),
    ),
    FieldSpec::optional("explainability_features", "Explainability features", text(0)),
    FieldSpec::required("user_documentation", "User documentation", set_with_none(USER_DOCUMENTATION)),
    FieldSpec::required(
        "transparency_adapted_to_risk",
        "Transparency adapted to risk",
        FieldKind::Choice(YES_NO),
    ),
];

const STEP_10: &[FieldSpec] = &[
    FieldSpec::required(
        "risk_management_system",
        "Risk management system",
        FieldKind::Choice(YES_IN_PROGRESS_NO),
    ),
    FieldSpec::required(
        "quality_management_system",
        "Quality management system",
        FieldKind::Choice(YES_IN_PROGRESS_NO),
    ),
    FieldSpec::required(
        "technical_documentation_status",
        "Technical documentation",
        FieldKind::Choice(DOCUMENTATION_STATUS),
    ),
    FieldSpec::required("post_market_monitoring", "Post-market monitoring", FieldKind::Choice(MONITORING_STATUS)),
    FieldSpec::required(
        "compliance_owner_assigned",
        "Compliance owner assigned",
        FieldKind::Choice(YES_NO),
    ),
    FieldSpec::gated(
        "compliance_owner",
        "Compliance owner",
        text(2),
        Gate::WhenEquals("compliance_owner_assigned", "yes"),
    ),
];

static STEPS: [StepDefinition; 10] = [
    StepDefinition { index: StepIndex::from_catalog(1), title: "Basic identification", fields: STEP_1 },
    StepDefinition { index: StepIndex::from_catalog(2), title: "Purpose, domain and users", fields: STEP_2 },
    StepDefinition { index: StepIndex::from_catalog(3), title: "Technical characteristics", fields: STEP_3 },
    StepDefinition { index: StepIndex::from_catalog(4), title: "Prohibited practices", fields: STEP_4 },
    StepDefinition { index: StepIndex::from_catalog(5), title: "High-risk domain categories", fields: STEP_5 },
    StepDefinition { index: StepIndex::from_catalog(6), title: "Safety components", fields: STEP_6 },
    StepDefinition { index: StepIndex::from_catalog(7), title: "Impact and human oversight", fields: STEP_7 },
    StepDefinition { index: StepIndex::from_catalog(8), title: "Data governance", fields: STEP_8 },
    StepDefinition { index: StepIndex::from_catalog(9), title: "Transparency", fields: STEP_9 },
    StepDefinition { index: StepIndex::from_catalog(10), title: "Governance readiness", fields: STEP_10 },
];

/// All step definitions in order.
pub fn steps() -> &'static [StepDefinition] {
    &STEPS
}

/// The definition of `step`.
pub fn step(step: StepIndex) -> &'static StepDefinition {
    &STEPS[usize::from(step.get() - 1)]
}

/// Look up a field by name anywhere in the catalog.
pub fn field(name: &str) -> Option<(&'static StepDefinition, &'static FieldSpec)> {
    STEPS
        .iter()
        .find_map(|def| def.field(name).map(|spec| (def, spec)))
}

/// The step that owns `field`, if it is a catalog field.
pub fn owning_step(field: &str) -> Option<StepIndex> {
    self::field(field).map(|(def, _)| def.index)
}
