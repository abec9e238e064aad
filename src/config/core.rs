use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::errors::{Error, Result};

/// Root configuration structure for refdetect
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RefdetectConfig {
    /// Body mapper limits and similarity thresholds
    #[serde(default)]
    pub mapper: MapperConfig,

    /// Acceptance thresholds for member and class matching
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Test framework annotation names
    #[serde(default)]
    pub tests: TestFrameworkConfig,

    /// Parallel processing configuration
    #[serde(default)]
    pub parallel: ParallelConfig,
}

impl RefdetectConfig {
    /// Reject thresholds outside their meaningful range
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("mapper.max_change_ratio", self.mapper.max_change_ratio),
            ("matching.operation_coverage", self.matching.operation_coverage),
            ("matching.extract_coverage", self.matching.extract_coverage),
            ("matching.class_similarity", self.matching.class_similarity),
        ];
        for (key, value) in ratios {
            if !(value > 0.0 && value <= 1.0) {
                return Err(Error::Configuration(format!(
                    "{key} must be in (0, 1], got {value}"
                )));
            }
        }
        if self.mapper.max_statements == 0 {
            return Err(Error::Configuration(
                "mapper.max_statements must be positive".to_string(),
            ));
        }
        if self.mapper.timeout_ms == 0 {
            return Err(Error::Configuration(
                "mapper.timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapperConfig {
    /// Combined statement count above which a method pair is not mapped
    #[serde(default = "default_max_statements")]
    pub max_statements: usize,

    /// Wall-clock budget for a single method pair, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum positional distance between sibling candidates
    #[serde(default = "default_search_window")]
    pub search_window: usize,

    /// Maximum fraction of differing tokens for two statements to be comparable
    #[serde(default = "default_max_change_ratio")]
    pub max_change_ratio: f64,
}

impl MapperConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_statements: default_max_statements(),
            timeout_ms: default_timeout_ms(),
            search_window: default_search_window(),
            max_change_ratio: default_max_change_ratio(),
        }
    }
}

pub fn default_max_statements() -> usize {
    1500
}

pub fn default_timeout_ms() -> u64 {
    2000
}

pub fn default_search_window() -> usize {
    24
}

pub fn default_max_change_ratio() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingConfig {
    /// Mapped share of the larger body for "same operation, modified"
    #[serde(default = "default_operation_coverage")]
    pub operation_coverage: f64,

    /// Mapped share of an extracted or inlined body
    #[serde(default = "default_extract_coverage")]
    pub extract_coverage: f64,

    /// Member similarity for renamed classes
    #[serde(default = "default_class_similarity")]
    pub class_similarity: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            operation_coverage: default_operation_coverage(),
            extract_coverage: default_extract_coverage(),
            class_similarity: default_class_similarity(),
        }
    }
}

pub fn default_operation_coverage() -> f64 {
    0.5
}

pub fn default_extract_coverage() -> f64 {
    0.5
}

pub fn default_class_similarity() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TestFrameworkConfig {
    #[serde(default = "default_parameterized_annotations")]
    pub parameterized_annotations: Vec<String>,

    #[serde(default = "default_source_annotations")]
    pub source_annotations: Vec<String>,

    #[serde(default = "default_test_annotations")]
    pub test_annotations: Vec<String>,
}

impl TestFrameworkConfig {
    pub fn is_parameterized(&self, simple_name: &str) -> bool {
        self.parameterized_annotations.iter().any(|a| a == simple_name)
    }

    pub fn is_source(&self, simple_name: &str) -> bool {
        self.source_annotations.iter().any(|a| a == simple_name)
    }

    pub fn is_test(&self, simple_name: &str) -> bool {
        self.test_annotations.iter().any(|a| a == simple_name)
            || self.is_parameterized(simple_name)
    }
}

impl Default for TestFrameworkConfig {
    fn default() -> Self {
        Self {
            parameterized_annotations: default_parameterized_annotations(),
            source_annotations: default_source_annotations(),
            test_annotations: default_test_annotations(),
        }
    }
}

pub fn default_parameterized_annotations() -> Vec<String> {
    vec!["ParameterizedTest".to_string()]
}

pub fn default_source_annotations() -> Vec<String> {
    [
        "ValueSource",
        "CsvSource",
        "MethodSource",
        "EnumSource",
        "CsvFileSource",
        "ArgumentsSource",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

pub fn default_test_annotations() -> Vec<String> {
    vec!["Test".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParallelConfig {
    /// Map independent method pairs and commits on the rayon pool
    #[serde(default = "default_parallel_enabled")]
    pub enabled: bool,

    /// Worker threads (0 = rayon default)
    #[serde(default)]
    pub jobs: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: default_parallel_enabled(),
            jobs: 0,
        }
    }
}

pub fn default_parallel_enabled() -> bool {
    true
}
