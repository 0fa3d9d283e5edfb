pub mod prompts;
pub mod render;

pub use prompts::{
    collect_request, parse_number, parse_optional_number, prompt_foods, prompt_targets,
    prompt_tolerance, prompt_yes_no,
};
pub use render::{display_failure, display_portions, display_search_results};
