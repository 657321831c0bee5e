pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    format_results_report, format_stats_report, log_file_path, query_text, run_query, run_stats,
};
