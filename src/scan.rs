use super::common::*;
use lazy_static::lazy_static;

fn up_right_diagonal(block_size: usize) -> Vec<(usize, usize)> {
    let mut order = Vec::with_capacity(block_size * block_size);
    let mut x = 0;
    let mut y: isize = 0;
    let mut stop_loop = false;
    while !stop_loop {
        while y >= 0 {
            if x < block_size && (y as usize) < block_size {
                order.push((x, y as usize));
            }
            y -= 1;
            x += 1;
        }
        y = x as isize;
        x = 0;
        if order.len() >= block_size * block_size {
            stop_loop = true;
        }
    }
    order
}

fn traverse(block_size: usize) -> Vec<(usize, usize)> {
    (0..block_size * block_size)
        .map(|i| (i % block_size, i / block_size))
        .collect()
}

fn inverse(order: &[(usize, usize)], block_size: usize) -> Vec<Vec<usize>> {
    let mut inv = vec![vec![0; block_size]; block_size];
    for (i, &(x, y)) in order.iter().enumerate() {
        inv[y][x] = i;
    }
    inv
}

lazy_static! {
    // [scan_idx][log2_block_size] -> (x, y) per scan position, up to 8x8
    static ref SCAN_ORDER: Vec<Vec<Vec<(usize, usize)>>> = {
        let diag = (0..=3).map(|log2| up_right_diagonal(1 << log2)).collect();
        let horiz = (0..=3).map(|log2| traverse(1 << log2)).collect::<Vec<_>>();
        let vert = horiz
            .iter()
            .map(|order: &Vec<(usize, usize)>| order.iter().map(|&(x, y)| (y, x)).collect())
            .collect();
        vec![diag, horiz, vert]
    };
    // [scan_idx][log2_block_size][y][x] -> scan position
    static ref SCAN_POS: Vec<Vec<Vec<Vec<usize>>>> = SCAN_ORDER
        .iter()
        .map(|orders| {
            orders
                .iter()
                .enumerate()
                .map(|(log2, order)| inverse(order, 1 << log2))
                .collect()
        })
        .collect();
}

#[inline(always)]
pub fn scan_order(scan_idx: ScanType, log2_size: usize) -> &'static [(usize, usize)] {
    &SCAN_ORDER[scan_idx as usize][log2_size]
}

#[inline(always)]
pub fn scan_pos(scan_idx: ScanType, log2_size: usize, x: usize, y: usize) -> usize {
    SCAN_POS[scan_idx as usize][log2_size][y][x]
}
