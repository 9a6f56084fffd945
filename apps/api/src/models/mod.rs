pub mod document;
pub mod feedback;
