//! Outbound ports - Interfaces that the application requires from external systems

mod gen_ai_port;

pub use gen_ai_port::{
    GenAiError, GeneratedImage, ImageGenerationPort, ImageRequest, StructuredTextRequest,
    TextGenerationPort,
};

#[cfg(test)]
pub use gen_ai_port::{MockImageGenerationPort, MockTextGenerationPort};
