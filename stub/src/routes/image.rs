use std::io::Cursor;

use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use image::{imageops::FilterType::Triangle, DynamicImage, GenericImageView, ImageFormat};
use log::{error, info, warn};

use super::message;
use crate::ServerConfig;

pub const FILE_FIELD: &str = "file";
/// Edge length the model expects; larger images are scaled down to fit.
pub const MODEL_INPUT_SIZE: u32 = 640;

pub async fn classify_image(
    State(server_config): State<ServerConfig>,
    mut multipart: Multipart,
) -> Response {
    let bytes = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some(FILE_FIELD) => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                match field.bytes().await {
                    Ok(bytes) => {
                        info!("received {file_name} ({} bytes)", bytes.len());
                        break bytes;
                    }
                    Err(err) => {
                        warn!("failed to read {file_name}: {err}");
                        return message(StatusCode::BAD_REQUEST, "Failed to read file");
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => return message(StatusCode::BAD_REQUEST, "No file part"),
            Err(err) => {
                warn!("malformed multipart body: {err}");
                return message(StatusCode::BAD_REQUEST, "Malformed multipart body");
            }
        }
    };
    server_config.uploads.record(&bytes);

    let source = match image::load_from_memory(&bytes) {
        Ok(source) => source,
        Err(err) => {
            warn!("upload is not a decodable image: {err}");
            return message(StatusCode::BAD_REQUEST, "Uploaded file is not a valid image");
        }
    };

    match encode_png(&fit_to_model(source)) {
        Ok(png) => ([(header::CONTENT_TYPE, "image/png")], png).into_response(),
        Err(err) => {
            error!("failed to encode result: {err}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to encode result")
        }
    }
}

fn fit_to_model(source: DynamicImage) -> DynamicImage {
    let (width, height) = source.dimensions();
    if width <= MODEL_INPUT_SIZE && height <= MODEL_INPUT_SIZE {
        return source;
    }
    source.resize(MODEL_INPUT_SIZE, MODEL_INPUT_SIZE, Triangle)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut png = Vec::new();
    image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}
