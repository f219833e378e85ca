use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::auth::Claims;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::user::UserProfileDto;
use crate::services::upload_service::{self, UploadKind};
use crate::services::user_service::{self, ProfileUpdate, ProfileView};

struct UploadedFile {
    name: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct ProfileForm {
    update: ProfileUpdate,
    profile_data_url: Option<String>,
    banner_data_url: Option<String>,
    profile_file: Option<UploadedFile>,
    banner_file: Option<UploadedFile>,
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

async fn read_form(mut multipart: Multipart) -> Result<ProfileForm, DomainError> {
    let mut form = ProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| DomainError::Validation(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "profilePicture" || name == "bannerPicture" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| DomainError::Validation(format!("Invalid file upload: {}", e)))?;
            if bytes.is_empty() {
                continue;
            }
            let file = UploadedFile {
                name: file_name,
                bytes: bytes.to_vec(),
            };
            if name == "profilePicture" {
                form.profile_file = Some(file);
            } else {
                form.banner_file = Some(file);
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| DomainError::Validation(format!("Invalid form field {}: {}", name, e)))?;

        match name.as_str() {
            "name" => form.update.name = non_empty(value),
            "bio" => form.update.bio = non_empty(value),
            "location" => form.update.location = non_empty(value),
            "website" => form.update.website = non_empty(value),
            "profilePictureDataUrl" => form.profile_data_url = non_empty(value),
            "bannerPictureDataUrl" => form.banner_data_url = non_empty(value),
            other => tracing::debug!("Ignoring profile form field {}", other),
        }
    }

    Ok(form)
}

/// Data URL if given, otherwise the uploaded file written to disk.
/// Stored file URLs are pushed to `stored` so a failed update can undo them.
async fn resolve_picture(
    state: &AppState,
    user_id: &str,
    kind: UploadKind,
    data_url: Option<String>,
    file: Option<UploadedFile>,
    stored: &mut Vec<String>,
) -> Result<Option<String>, DomainError> {
    if data_url.is_some() {
        return Ok(data_url);
    }
    match file {
        Some(file) => {
            let url = upload_service::store_upload(
                &state.config.upload_dir,
                user_id,
                kind,
                &file.name,
                &file.bytes,
            )
            .await?;
            stored.push(url.clone());
            Ok(Some(url))
        }
        None => Ok(None),
    }
}

async fn apply_update(
    state: &AppState,
    user_id: &str,
    form: ProfileForm,
    stored: &mut Vec<String>,
) -> Result<UserProfileDto, DomainError> {
    let mut update = form.update;
    update.image = resolve_picture(
        state,
        user_id,
        UploadKind::Profile,
        form.profile_data_url,
        form.profile_file,
        stored,
    )
    .await?;
    update.banner_image = resolve_picture(
        state,
        user_id,
        UploadKind::Banner,
        form.banner_data_url,
        form.banner_file,
        stored,
    )
    .await?;

    user_service::update_profile(state.db(), user_id, update).await
}

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Own profile with counts"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<ProfileView>, DomainError> {
    let profile =
        user_service::get_profile(state.db(), claims.user_id(), Some(claims.user_id())).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile updated"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not signed in")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    claims: Claims,
    multipart: Multipart,
) -> Result<impl IntoResponse, DomainError> {
    let user_id = claims.user_id();
    let form = read_form(multipart).await?;
    form.update.validate()?;

    let mut stored = Vec::new();
    match apply_update(&state, user_id, form, &mut stored).await {
        Ok(user) => Ok(Json(
            json!({ "message": "Profile updated successfully", "user": user }),
        )),
        Err(e) => {
            for url in &stored {
                upload_service::remove_upload(&state.config.upload_dir, url).await;
            }
            Err(e)
        }
    }
}
