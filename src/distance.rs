use std::cmp::Ordering;

use rayon::prelude::*;

/// 少于该数量的向量时不启用并行计算
const PAR_THRESHOLD: usize = 4096;

/// 计算两个向量的平方欧氏距离
#[inline(always)]
pub fn l2_sqr(va: &[f32], vb: &[f32]) -> f32 {
    debug_assert_eq!(va.len(), vb.len());
    va.iter().zip(vb).map(|(a, b)| (a - b) * (a - b)).sum()
}

/// 计算向量 va 与 vb 中每个向量的平方欧氏距离，返回距离最小的 k 个位置和距离
///
/// 参数：
/// - va: d 维查询向量
/// - vb: 按行连续存储的若干组 d 维向量
/// - k: 返回的最近邻居数量
///
/// 结果按距离升序排列，距离相同时位置靠前的排在前面
pub fn knn_l2(va: &[f32], vb: &[f32], k: usize) -> Vec<(usize, f32)> {
    let d = va.len();
    if d == 0 || k == 0 {
        return vec![];
    }

    let mut dis: Vec<(usize, f32)> = if vb.len() / d >= PAR_THRESHOLD {
        vb.par_chunks_exact(d).map(|chunk| l2_sqr(va, chunk)).enumerate().collect()
    } else {
        vb.chunks_exact(d).map(|chunk| l2_sqr(va, chunk)).enumerate().collect()
    };

    if k < dis.len() {
        dis.select_nth_unstable_by(k, cmp_neighbor);
        dis.truncate(k);
    }
    dis.sort_unstable_by(cmp_neighbor);
    dis
}

fn cmp_neighbor(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then(a.0.cmp(&b.0))
}
