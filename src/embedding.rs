use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageReader;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::EmbeddingOptions;
use crate::error::{Error, Result};

/// 将文本或图片转换为固定维度的向量
#[async_trait]
pub trait Embedder: Send + Sync {
    /// 文本向量化
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;

    /// 图片向量化
    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Value,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// 兼容 OpenAI Embeddings API 的向量化服务
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl OpenAiEmbedder {
    pub fn new(opts: &EmbeddingOptions) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(opts.embedding_timeout))
            .build()
            .map_err(|e| Error::Embedding(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", opts.embedding_url.trim_end_matches('/')),
            api_key: opts.api_key.clone(),
            text_model: opts.text_model.clone(),
            image_model: opts.image_model.clone(),
        })
    }

    async fn request(&self, model: &str, input: Value) -> Result<Vec<f32>> {
        debug!("请求向量化服务: {} ({})", self.endpoint, model);
        let mut req = self.client.post(&self.endpoint).json(&EmbeddingRequest { model, input });
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let resp = req.send().await.map_err(|e| Error::Embedding(e.to_string()))?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| Error::Embedding(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Embedding(format!(
                "{}: {}",
                status,
                String::from_utf8_lossy(&body)
            )));
        }
        parse_response(&body)
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::Validation("文本不能为空".into()));
        }
        self.request(&self.text_model, Value::String(text.to_string())).await
    }

    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>> {
        check_image(image)?;
        let input = Value::Array(vec![Value::String(STANDARD.encode(image))]);
        self.request(&self.image_model, input).await
    }
}

/// 检查数据是否为可识别的图片，只解析图片头
pub fn check_image(image: &[u8]) -> Result<()> {
    if image.is_empty() {
        return Err(Error::Validation("图片数据为空".into()));
    }
    let (width, height) = ImageReader::new(Cursor::new(image))
        .with_guessed_format()
        .map_err(|e| Error::Validation(format!("无效的图片数据: {}", e)))?
        .into_dimensions()
        .map_err(|e| Error::Validation(format!("无效的图片数据: {}", e)))?;
    debug!("图片尺寸: {}x{}", width, height);
    Ok(())
}

/// 从响应中取出第一条向量
fn parse_response(body: &[u8]) -> Result<Vec<f32>> {
    let resp: EmbeddingResponse =
        serde_json::from_slice(body).map_err(|e| Error::Embedding(format!("无效的响应: {}", e)))?;
    let vector = resp
        .data
        .into_iter()
        .next()
        .map(|d| d.embedding)
        .ok_or_else(|| Error::Embedding("响应中没有向量".into()))?;
    if vector.is_empty() {
        return Err(Error::Embedding("响应中的向量为空".into()));
    }
    Ok(vector)
}
