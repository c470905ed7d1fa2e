use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::distance::knn_l2;
use crate::error::{Error, Result};

/// 索引文件格式版本
const INDEX_VERSION: u32 = 1;

/// 一次近邻查询的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// 媒体的内部 ID，小于 0 表示该位置没有向量
    pub id: i64,
    /// 平方欧氏距离
    pub distance: f32,
}

/// 暴力扫描的精确近邻索引
///
/// 只支持追加，同一个 ID 可以出现多次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlatIndex {
    version: u32,
    dimension: usize,
    ids: Vec<i64>,
    /// 按行连续存储的向量，长度为 ids.len() * dimension
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self { version: INDEX_VERSION, dimension, ids: vec![], vectors: vec![] }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// 索引中的向量总数
    pub fn ntotal(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 检查向量维度是否与索引一致
    pub fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }

    /// 追加一条向量
    pub fn add_with_id(&mut self, id: i64, vector: &[f32]) -> Result<()> {
        self.check_dimension(vector)?;
        self.ids.push(id);
        self.vectors.extend_from_slice(vector);
        Ok(())
    }

    /// 搜索最接近的 k 条向量，按距离升序返回
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimension(query)?;
        Ok(knn_l2(query, &self.vectors, k)
            .into_iter()
            .map(|(i, distance)| Neighbor { id: self.ids[i], distance })
            .collect())
    }

    /// 从文件中加载索引，文件不存在时返回 None
    pub fn read_file(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Index(format!("{}: {}", path.display(), e))),
        };
        let index: Self = bincode::deserialize_from(BufReader::new(file))?;

        if index.version != INDEX_VERSION {
            return Err(Error::Index(format!("不支持的索引版本: {}", index.version)));
        }
        if index.dimension == 0 || index.vectors.len() != index.ids.len() * index.dimension {
            return Err(Error::Index(format!("索引文件已损坏: {}", path.display())));
        }

        debug!("从 {} 加载了 {} 条向量", path.display(), index.ntotal());
        Ok(Some(index))
    }

    /// 将索引完整写入文件
    ///
    /// 先写入临时文件再重命名，写入失败时不会破坏旧文件
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let tmp_file = path.with_extension("tmp");
        let io_err = |e: std::io::Error| Error::Index(format!("{}: {}", path.display(), e));

        let mut writer = BufWriter::new(File::create(&tmp_file).map_err(io_err)?);
        bincode::serialize_into(&mut writer, self)?;
        writer.into_inner().map_err(|e| io_err(e.into_error()))?.sync_all().map_err(io_err)?;
        fs::rename(&tmp_file, path).map_err(io_err)?;
        Ok(())
    }
}
