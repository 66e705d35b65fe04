pub mod agent;
pub mod error;
pub mod extract;
pub mod llm;
pub mod normalize;
pub mod prompts;
pub mod service;
pub mod tools;
pub mod vision;

pub use agent::{build_agent, Agent, AgentTask, ToolCallingAgent, UnconfiguredAgent};
pub use error::{AgentError, NormalizeError, ToolError};
pub use extract::{extract_coupons_from_text, extract_form_fields};
pub use llm::ChatClient;
pub use normalize::{coupons_from_value, form_fields_from_value, normalize_agent_output};
pub use service::{analyze, analyze_form, has_form_controls};
pub use tools::{coupon_tools, Tool, ToolCall};
pub use vision::VisionOcr;
