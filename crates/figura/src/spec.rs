//! Normalization of untrusted diagram content.
//!
//! Raw content arrives as an arbitrary [`serde_json::Value`], usually produced
//! by a text generator that does not follow any schema closely. This module is
//! the single boundary that turns it into one of the strict, bounded
//! [`NormalizedSpec`] variants consumed by the layout stage.
//!
//! Normalization never fails. Missing or malformed parts are replaced by
//! deterministic defaults, oversized parts are truncated, and the result is a
//! fixed point: feeding the serialized output back in yields the same spec.
//!
//! # Accepted shapes
//!
//! ```json
//! { "title": "...", "stages": [ { "title": "...", "bullets": ["...", "..."] } ] }
//! { "goal": { "title": "...", "bullets": "..." }, "work_packages": [ ... ] }
//! ```
//!
//! Each field may also appear under an alias (`steps`, `name`, `items`,
//! `lines`, `modules`, `wps`), and a bare string is accepted wherever a bullet
//! list is expected.

use std::{fmt, str::FromStr};

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FiguraError;

/// Maximum title length of a sequential stage, in characters.
pub const STAGE_TITLE_CAP: usize = 32;

/// Maximum title length of a hierarchical framework box, in characters.
pub const FRAMEWORK_TITLE_CAP: usize = 28;

/// Maximum number of bullets kept per box.
pub const BULLET_CAP: usize = 4;

pub const MIN_STAGES: usize = 3;
pub const MAX_STAGES: usize = 6;

/// Number of work packages in a hierarchical framework.
pub const WORK_PACKAGE_COUNT: usize = 3;

const STAGE_LIST_KEYS: &[&str] = &["stages", "steps"];
const TITLE_KEYS: &[&str] = &["title", "name"];
const BULLET_KEYS: &[&str] = &["bullets", "items", "lines"];
const WORK_PACKAGE_KEYS: &[&str] = &["work_packages", "modules", "wps"];

const DEFAULT_SEQUENTIAL_TITLE: &str = "Technical Roadmap";
const DEFAULT_HIERARCHICAL_TITLE: &str = "Research Framework";

const DEFAULT_STAGE_BULLETS: [&str; 3] = [
    "Key methods and technical route",
    "Data, experiments and validation",
    "Stage deliverables and metrics",
];

const DEFAULT_SKELETON: [(&str, [&str; 3]); 3] = [
    (
        "Task Breakdown",
        [
            "Clarify goals and metrics",
            "Map out the key problems",
            "Break down work packages",
        ],
    ),
    (
        "Method Implementation",
        [
            "Core method design",
            "Key technique implementation",
            "Experiment and simulation validation",
        ],
    ),
    (
        "Integration & Evaluation",
        [
            "System integration and tuning",
            "Benchmarking and iteration",
            "Consolidate deliverables",
        ],
    ),
];

const DEFAULT_WORK_PACKAGE_BULLETS: [&str; 3] = [
    "Research content and tasks",
    "Key methods and experiments",
    "Milestones and metrics",
];

/// Diagram archetype: which normalizer and layout strategy to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    /// Vertical stack of numbered stages joined by arrows.
    SequentialFlow,
    /// Goal, two-column row, three work packages and outcomes with fan-out/fan-in.
    HierarchicalFramework,
}

impl DiagramKind {
    /// Canonical name of the diagram type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SequentialFlow => "sequential_flow",
            Self::HierarchicalFramework => "hierarchical_framework",
        }
    }

    /// Title used when neither the caller nor the content supplies one.
    pub fn default_title(self) -> &'static str {
        match self {
            Self::SequentialFlow => DEFAULT_SEQUENTIAL_TITLE,
            Self::HierarchicalFramework => DEFAULT_HIERARCHICAL_TITLE,
        }
    }
}

impl FromStr for DiagramKind {
    type Err = FiguraError;

    /// Parses a diagram type name.
    ///
    /// Accepts the canonical names plus `technical_route` and
    /// `research_framework`. Surrounding whitespace is ignored; matching is
    /// case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sequential_flow" | "technical_route" => Ok(Self::SequentialFlow),
            "hierarchical_framework" | "research_framework" => Ok(Self::HierarchicalFramework),
            _ => Err(FiguraError::InvalidDiagramType(s.to_string())),
        }
    }
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled box with a short bullet list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBox {
    id: String,
    title: String,
    bullets: Vec<String>,
}

impl ContentBox {
    pub fn new(id: impl Into<String>, title: impl Into<String>, bullets: Vec<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            bullets,
        }
    }

    /// Deterministic identifier derived from the box role and position.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn bullets(&self) -> &[String] {
        &self.bullets
    }
}

/// Normalized content of a sequential flow: three to six stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialSpec {
    title: String,
    stages: Vec<ContentBox>,
}

impl SequentialSpec {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn stages(&self) -> &[ContentBox] {
        &self.stages
    }
}

/// Normalized content of a hierarchical framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchicalSpec {
    title: String,
    goal: ContentBox,
    hypotheses: ContentBox,
    support: ContentBox,
    work_packages: [ContentBox; WORK_PACKAGE_COUNT],
    outcomes: ContentBox,
}

impl HierarchicalSpec {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn goal(&self) -> &ContentBox {
        &self.goal
    }

    pub fn hypotheses(&self) -> &ContentBox {
        &self.hypotheses
    }

    pub fn support(&self) -> &ContentBox {
        &self.support
    }

    pub fn work_packages(&self) -> &[ContentBox; WORK_PACKAGE_COUNT] {
        &self.work_packages
    }

    pub fn outcomes(&self) -> &ContentBox {
        &self.outcomes
    }
}

/// Strict, bounded content for one of the diagram archetypes.
///
/// Serializes (through serde) to the same JSON shape the normalizer accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedSpec {
    Sequential(SequentialSpec),
    Hierarchical(HierarchicalSpec),
}

impl NormalizedSpec {
    pub fn kind(&self) -> DiagramKind {
        match self {
            Self::Sequential(_) => DiagramKind::SequentialFlow,
            Self::Hierarchical(_) => DiagramKind::HierarchicalFramework,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Sequential(spec) => spec.title(),
            Self::Hierarchical(spec) => spec.title(),
        }
    }
}

/// Normalizes `raw` for the given archetype.
///
/// `title` takes precedence over a `title` field inside `raw`; when both are
/// blank the archetype default is used.
pub fn normalize(kind: DiagramKind, raw: &Value, title: &str) -> NormalizedSpec {
    let spec = match kind {
        DiagramKind::SequentialFlow => NormalizedSpec::Sequential(normalize_sequential(raw, title)),
        DiagramKind::HierarchicalFramework => {
            NormalizedSpec::Hierarchical(normalize_hierarchical(raw, title))
        }
    };
    trace!(spec:? = spec; "Normalized spec");
    spec
}

/// Normalizes raw content into a [`SequentialSpec`].
pub fn normalize_sequential(raw: &Value, title: &str) -> SequentialSpec {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let raw_stages = lookup(obj, STAGE_LIST_KEYS)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut stages = Vec::new();
    for raw_stage in raw_stages {
        let Some(raw_stage) = raw_stage.as_object() else {
            debug!("Skipping non-object stage entry");
            continue;
        };

        let stage_title = box_title(raw_stage);
        let bullets = bullet_list(lookup(raw_stage, BULLET_KEYS));
        if stage_title.is_empty() && bullets.is_empty() {
            continue;
        }

        let n = stages.len() + 1;
        let stage_title = if stage_title.is_empty() {
            format!("Stage {n}")
        } else {
            stage_title
        };
        let bullets = or_default_bullets(bullets, &DEFAULT_STAGE_BULLETS);
        stages.push(ContentBox::new(
            format!("stage-{n}"),
            truncate_title(&stage_title, STAGE_TITLE_CAP),
            bullets,
        ));

        if stages.len() >= MAX_STAGES {
            break;
        }
    }

    if stages.len() < MIN_STAGES {
        warn!(
            kept = stages.len(),
            minimum = MIN_STAGES;
            "Too few usable stages, using the default skeleton",
        );
        stages = default_skeleton();
    }
    debug!(stages = stages.len(); "Normalized sequential flow");

    SequentialSpec {
        title: diagram_title(title, obj, DiagramKind::SequentialFlow),
        stages,
    }
}

/// Normalizes raw content into a [`HierarchicalSpec`].
pub fn normalize_hierarchical(raw: &Value, title: &str) -> HierarchicalSpec {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let goal = singleton_box(
        obj,
        "goal",
        "Research Goal",
        &[
            "Distill the core objective",
            "Clarify the innovations",
            "Quantify assessment metrics",
        ],
    );
    let hypotheses = singleton_box(
        obj,
        "hypotheses",
        "Key Questions & Hypotheses",
        &[
            "Pose the key scientific questions",
            "State testable hypotheses",
            "Define the validation path",
        ],
    );
    let support = singleton_box(
        obj,
        "support",
        "Supporting Conditions",
        &[
            "Prior work and team",
            "Data, platforms and equipment",
            "Partnerships and resources",
        ],
    );
    let outcomes = singleton_box(
        obj,
        "outcomes",
        "Expected Outcomes",
        &[
            "Papers, patents and standards",
            "Prototypes, systems and platforms",
            "Datasets and open-source tools",
        ],
    );

    HierarchicalSpec {
        title: diagram_title(title, obj, DiagramKind::HierarchicalFramework),
        goal,
        hypotheses,
        support,
        work_packages: work_packages(obj),
        outcomes,
    }
}

fn work_packages(obj: &Map<String, Value>) -> [ContentBox; WORK_PACKAGE_COUNT] {
    let raw_packages = lookup(obj, WORK_PACKAGE_KEYS)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut kept: Vec<(String, Vec<String>)> = Vec::with_capacity(WORK_PACKAGE_COUNT);
    for raw_package in raw_packages {
        let Some(raw_package) = raw_package.as_object() else {
            continue;
        };
        let package_title = box_title(raw_package);
        let bullets = bullet_list(lookup(raw_package, BULLET_KEYS));
        if package_title.is_empty() && bullets.is_empty() {
            continue;
        }
        kept.push((package_title, bullets));
        if kept.len() == WORK_PACKAGE_COUNT {
            break;
        }
    }

    if raw_packages.len() > kept.len() {
        debug!(
            supplied = raw_packages.len(),
            kept = kept.len();
            "Dropped surplus or empty work packages",
        );
    }

    let mut kept = kept.into_iter();
    std::array::from_fn(|i| {
        let n = i + 1;
        let (package_title, bullets) = kept.next().unwrap_or_default();
        let package_title = if package_title.is_empty() {
            format!("WP{n}")
        } else {
            package_title
        };
        ContentBox::new(
            format!("wp-{n}"),
            truncate_title(&package_title, FRAMEWORK_TITLE_CAP),
            or_default_bullets(bullets, &DEFAULT_WORK_PACKAGE_BULLETS),
        )
    })
}

fn singleton_box(
    obj: &Map<String, Value>,
    key: &str,
    default_title: &str,
    default_bullets: &[&str],
) -> ContentBox {
    let empty = Map::new();
    let raw_box = lookup(obj, &[key])
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let mut box_title = box_title(raw_box);
    if box_title.is_empty() {
        box_title = default_title.to_string();
    }
    let bullets = or_default_bullets(bullet_list(lookup(raw_box, BULLET_KEYS)), default_bullets);

    ContentBox::new(key, truncate_title(&box_title, FRAMEWORK_TITLE_CAP), bullets)
}

fn default_skeleton() -> Vec<ContentBox> {
    DEFAULT_SKELETON
        .iter()
        .enumerate()
        .map(|(i, (title, bullets))| {
            ContentBox::new(format!("stage-{}", i + 1), *title, owned(bullets))
        })
        .collect()
}

fn diagram_title(title: &str, obj: &Map<String, Value>, kind: DiagramKind) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return title.to_string();
    }
    lookup(obj, &["title"])
        .and_then(scalar_text)
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| kind.default_title().to_string())
}

fn box_title(obj: &Map<String, Value>) -> String {
    lookup(obj, TITLE_KEYS)
        .and_then(scalar_text)
        .unwrap_or_default()
}

/// Returns the value of the first key whose value is truthy.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| is_truthy(value))
}

/// Null, `false`, zero and empty strings, arrays or objects are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Coerces a scalar to trimmed text; containers and null yield `None`.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Bullets from a list or a bare string, trimmed, non-empty and capped.
fn bullet_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .filter(|item| !item.is_empty())
            .take(BULLET_CAP)
            .collect(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Vec::new()
            } else {
                vec![s.to_string()]
            }
        }
        _ => Vec::new(),
    }
}

fn or_default_bullets(bullets: Vec<String>, defaults: &[&str]) -> Vec<String> {
    if bullets.is_empty() {
        owned(defaults)
    } else {
        bullets
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|item| (*item).to_string()).collect()
}

/// Keeps at most `cap` characters, without any truncation marker.
fn truncate_title(title: &str, cap: usize) -> String {
    let truncated: String = title.trim().chars().take(cap).collect();
    truncated.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn stage(title: &str) -> Value {
        json!({ "title": title, "bullets": [format!("{title} work")] })
    }

    #[test]
    fn test_diagram_kind_from_str() {
        assert_eq!(
            "sequential_flow".parse::<DiagramKind>().unwrap(),
            DiagramKind::SequentialFlow
        );
        assert_eq!(
            " technical_route ".parse::<DiagramKind>().unwrap(),
            DiagramKind::SequentialFlow
        );
        assert_eq!(
            "research_framework".parse::<DiagramKind>().unwrap(),
            DiagramKind::HierarchicalFramework
        );
        assert!(matches!(
            "unknown_type".parse::<DiagramKind>(),
            Err(FiguraError::InvalidDiagramType(name)) if name == "unknown_type"
        ));
        assert!("Sequential_Flow".parse::<DiagramKind>().is_err());
    }

    #[test]
    fn test_empty_stages_use_skeleton() {
        let spec = normalize_sequential(&json!({ "stages": [] }), "Roadmap");
        assert_eq!(spec.title(), "Roadmap");
        let titles: Vec<_> = spec.stages().iter().map(ContentBox::title).collect();
        assert_eq!(
            titles,
            ["Task Breakdown", "Method Implementation", "Integration & Evaluation"]
        );
        assert!(spec.stages().iter().all(|s| s.bullets().len() == 3));
    }

    #[test]
    fn test_two_stages_replaced_entirely() {
        let spec = normalize_sequential(&json!({ "stages": [stage("A"), stage("B")] }), "");
        assert_eq!(spec.stages()[0].title(), "Task Breakdown");
        assert_eq!(spec.stages().len(), 3);
    }

    #[test]
    fn test_excess_stages_truncated() {
        let stages: Vec<Value> = (1..=8).map(|i| stage(&format!("S{i}"))).collect();
        let spec = normalize_sequential(&json!({ "stages": stages }), "X");
        assert_eq!(spec.stages().len(), 6);
        assert_eq!(spec.stages()[5].title(), "S6");
        assert_eq!(spec.stages()[5].id(), "stage-6");
    }

    #[test]
    fn test_stage_aliases_and_coercion() {
        let raw = json!({
            "steps": [
                { "name": "Survey", "items": "read papers" },
                { "title": "", "name": "Build", "lines": ["code", 42, null, "  ", ["nested"]] },
                { "bullets": ["only bullets"] },
                { "title": "   " },
                "not an object",
            ]
        });
        let spec = normalize_sequential(&raw, "");
        let stages = spec.stages();
        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].title(), "Survey");
        assert_eq!(stages[0].bullets(), ["read papers"]);
        assert_eq!(stages[1].title(), "Build");
        assert_eq!(stages[1].bullets(), ["code", "42"]);
        assert_eq!(stages[2].title(), "Stage 3");
        assert_eq!(stages[2].id(), "stage-3");
    }

    #[test]
    fn test_titled_stage_without_bullets_gets_defaults() {
        let raw = json!({ "stages": [
            { "title": "A" }, { "title": "B", "bullets": [] }, { "title": "C", "bullets": "" }
        ]});
        let spec = normalize_sequential(&raw, "");
        for stage in spec.stages() {
            assert_eq!(stage.bullets(), DEFAULT_STAGE_BULLETS);
        }
    }

    #[test]
    fn test_bullets_capped() {
        let raw = json!({ "stages": [
            { "title": "A", "bullets": ["1", "2", "3", "4", "5", "6"] },
            stage("B"),
            stage("C"),
        ]});
        let spec = normalize_sequential(&raw, "");
        assert_eq!(spec.stages()[0].bullets(), ["1", "2", "3", "4"]);
    }

    #[test]
    fn test_title_truncation_counts_characters() {
        let long = "研".repeat(40);
        assert_eq!(truncate_title(&long, 32).chars().count(), 32);
        assert_eq!(truncate_title("  short  ", 32), "short");
        assert_eq!(truncate_title("abc   def", 4), "abc");
    }

    #[test]
    fn test_diagram_title_precedence() {
        let raw = json!({ "title": "From Spec", "stages": [] });
        assert_eq!(normalize_sequential(&raw, "Arg").title(), "Arg");
        assert_eq!(normalize_sequential(&raw, "   ").title(), "From Spec");
        assert_eq!(
            normalize_sequential(&json!({}), "").title(),
            "Technical Roadmap"
        );
        assert_eq!(
            normalize_hierarchical(&json!([1, 2]), "").title(),
            "Research Framework"
        );
    }

    #[test]
    fn test_hierarchical_defaults() {
        let spec = normalize_hierarchical(&json!({}), "Y");
        assert_eq!(spec.goal().title(), "Research Goal");
        assert_eq!(spec.hypotheses().title(), "Key Questions & Hypotheses");
        assert_eq!(spec.support().title(), "Supporting Conditions");
        assert_eq!(spec.outcomes().title(), "Expected Outcomes");
        let wp_titles: Vec<_> = spec.work_packages().iter().map(ContentBox::title).collect();
        assert_eq!(wp_titles, ["WP1", "WP2", "WP3"]);
        assert_eq!(spec.work_packages()[2].id(), "wp-3");
    }

    #[test]
    fn test_hierarchical_work_packages_first_three_kept() {
        let packages: Vec<Value> = (1..=5).map(|i| stage(&format!("Package {i}"))).collect();
        let spec = normalize_hierarchical(&json!({ "modules": packages }), "Y");
        let titles: Vec<_> = spec.work_packages().iter().map(ContentBox::title).collect();
        assert_eq!(titles, ["Package 1", "Package 2", "Package 3"]);
    }

    #[test]
    fn test_hierarchical_work_packages_padded() {
        let raw = json!({ "work_packages": [ { "bullets": "only bullets" } ] });
        let spec = normalize_hierarchical(&raw, "Y");
        let packages = spec.work_packages();
        assert_eq!(packages[0].title(), "WP1");
        assert_eq!(packages[0].bullets(), ["only bullets"]);
        assert_eq!(packages[1].title(), "WP2");
        assert_eq!(packages[1].bullets(), DEFAULT_WORK_PACKAGE_BULLETS);
    }

    #[test]
    fn test_hierarchical_title_cap() {
        let raw = json!({ "goal": { "title": "x".repeat(50), "bullets": ["g"] } });
        let spec = normalize_hierarchical(&raw, "Y");
        assert_eq!(spec.goal().title().chars().count(), FRAMEWORK_TITLE_CAP);
        assert_eq!(spec.goal().bullets(), ["g"]);
    }

    #[test]
    fn test_serialized_shape() {
        let spec = normalize(DiagramKind::HierarchicalFramework, &json!({}), "Y");
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["work_packages"].as_array().unwrap().len(), 3);
        assert_eq!(value["goal"]["id"], "goal");

        let back: NormalizedSpec = serde_json::from_value(value).unwrap();
        assert_eq!(back, spec);
    }

    fn raw_stage() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            "[a-zA-Z ]{0,40}".prop_map(Value::from),
            (
                proptest::option::of("[a-zA-Z研究 ]{0,50}"),
                proptest::collection::vec("[a-z ]{0,12}", 0..7),
            )
                .prop_map(|(title, bullets)| match title {
                    Some(title) => json!({ "title": title, "bullets": bullets }),
                    None => json!({ "items": bullets }),
                }),
        ]
    }

    fn raw_spec() -> impl Strategy<Value = Value> {
        (
            proptest::collection::vec(raw_stage(), 0..10),
            proptest::option::of("[a-zA-Z ]{0,20}"),
        )
            .prop_map(|(stages, title)| {
                json!({
                    "title": title,
                    "stages": stages.clone(),
                    "goal": stages.first().cloned().unwrap_or(Value::Null),
                    "support": stages.last().cloned().unwrap_or(Value::Null),
                    "work_packages": stages,
                })
            })
    }

    proptest! {
        #[test]
        fn prop_stage_count_bounded(raw in raw_spec(), title in "[a-z ]{0,10}") {
            let spec = normalize_sequential(&raw, &title);
            prop_assert!((MIN_STAGES..=MAX_STAGES).contains(&spec.stages().len()));
            for stage in spec.stages() {
                prop_assert!(stage.title().chars().count() <= STAGE_TITLE_CAP);
                prop_assert!(!stage.bullets().is_empty());
                prop_assert!(stage.bullets().len() <= BULLET_CAP);
            }
        }

        #[test]
        fn prop_framework_has_three_packages(raw in raw_spec()) {
            let spec = normalize_hierarchical(&raw, "");
            prop_assert_eq!(spec.work_packages().len(), WORK_PACKAGE_COUNT);
            for content in [spec.goal(), spec.hypotheses(), spec.support(), spec.outcomes()] {
                prop_assert!(!content.title().is_empty());
                prop_assert!(content.title().chars().count() <= FRAMEWORK_TITLE_CAP);
            }
        }

        #[test]
        fn prop_normalization_is_idempotent(raw in raw_spec(), title in "[a-z ]{0,10}") {
            for kind in [DiagramKind::SequentialFlow, DiagramKind::HierarchicalFramework] {
                let once = normalize(kind, &raw, &title);
                let twice = normalize(kind, &serde_json::to_value(&once).unwrap(), &title);
                prop_assert_eq!(&once, &twice);
            }
        }

        #[test]
        fn prop_long_titles_truncated_to_cap(title in "[a-zA-Z]{33,80}") {
            let truncated = truncate_title(&title, STAGE_TITLE_CAP);
            prop_assert_eq!(truncated.chars().count(), STAGE_TITLE_CAP);
            prop_assert!(title.starts_with(&truncated));
        }
    }
}
