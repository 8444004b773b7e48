/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Quiz retrieval, grading and content upload.
pub mod quiz_service;
/// Background connection supervisor for the quiz store.
pub mod storage_supervisor;
