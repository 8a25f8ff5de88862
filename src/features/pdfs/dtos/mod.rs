mod pdf_dto;

pub use pdf_dto::{PdfQuery, PdfResponseDto, PdfUpload, UploadPdfDto};
