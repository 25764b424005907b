// src/utils/error.rs
#![allow(dead_code)]
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Failed to bind PDFium library: {0}")]
    Bind(String),

    #[error("Failed to open document '{path}': {reason}")]
    Open { path: String, reason: String },

    #[error("Page index {0} out of range")]
    PageOutOfRange(usize),

    #[error("Text extraction failed on page {page}: {reason}")]
    TextExtraction { page: usize, reason: String },

    #[error("Failed to copy page region: {0}")]
    PageCopy(String),

    #[error("Failed to draw preview overlay: {0}")]
    Overlay(String),

    #[error("Failed to save output document: {0}")]
    Save(String),
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid section pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Document access failed: {0}")]
    Pdf(#[from] PdfError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("PDF access failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
