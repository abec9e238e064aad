// Core configuration types
mod core;
mod loader;

pub use self::core::{
    default_class_similarity, default_extract_coverage, default_max_change_ratio,
    default_max_statements, default_operation_coverage, default_parallel_enabled,
    default_parameterized_annotations, default_search_window, default_source_annotations,
    default_test_annotations, default_timeout_ms, MapperConfig, MatchingConfig, ParallelConfig,
    RefdetectConfig, TestFrameworkConfig,
};

pub use self::loader::{
    default_config_toml, directory_ancestors, discover_config, load_config, load_config_from,
    parse_and_validate_config, CONFIG_FILE_NAME,
};
