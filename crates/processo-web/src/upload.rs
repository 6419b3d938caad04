use axum::extract::Multipart;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// An uploaded PDF with its data and client-side name.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Read the `file` field of a multipart upload. Other fields are ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, String> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Failed to read form field: {}", e))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field.file_name().unwrap_or("upload.pdf").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| format!("Failed to read file data: {}", e))?
                .to_vec();
            check_pdf(&data)?;
            file = Some(UploadedFile { filename, data });
        } else {
            let _ = field.bytes().await;
        }
    }

    file.ok_or_else(|| "No file uploaded".to_string())
}

fn check_pdf(data: &[u8]) -> Result<(), String> {
    if data.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err("Uploaded file doesn't appear to be a valid PDF".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_magic_only() {
        assert!(check_pdf(b"%PDF-1.7\n...").is_ok());
        assert!(check_pdf(b"PK\x03\x04").is_err());
        assert!(check_pdf(b"").is_err());
    }
}
