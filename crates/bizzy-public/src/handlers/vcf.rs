//! vCard download: `GET /public/{token}/vcf`.

use axum::{
  body::Body,
  http::{StatusCode, header},
  response::Response,
};
use bizzy_core::store::{BlobStore, CardStore};

use crate::{
  AppState,
  error::Error,
  handlers::{card_by_token, public_card},
};

pub async fn handler<S, B>(
  state: &AppState<S, B>,
  token: &str,
) -> Result<Response, Error>
where
  S: CardStore + Clone + Send + Sync + 'static,
  B: BlobStore + Clone + Send + Sync + 'static,
{
  let card = card_by_token(state, token).await?;
  let public = public_card(state, &card).await?;
  let vcf = bizzy_vcard::serialize(&public);
  let filename = bizzy_vcard::vcf_filename(&card.name);

  Ok(
    Response::builder()
      .status(StatusCode::OK)
      .header(header::CONTENT_TYPE, "text/vcard")
      .header(
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{filename}\""),
      )
      .header(header::CONTENT_LENGTH, vcf.len())
      .body(Body::from(vcf))
      .expect("static response"),
  )
}
