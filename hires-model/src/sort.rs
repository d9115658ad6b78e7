//! Stable sort of faces by material index.

use crate::tile::TileModel;

const INSERTION_SORT_THRESHOLD: usize = 16;

impl TileModel {
    /// Reorder faces so equal material indices are contiguous, keeping the
    /// order of faces with the same material.
    pub fn sort(&mut self) {
        let size = self.size();
        if size <= 1 {
            return;
        }

        let mut index: Vec<usize> = (0..size).collect();
        let mut scratch = index.clone();
        merge_sort(&mut scratch, &mut index, 0, size, &self.material);
        self.apply_permutation(&index);
    }

    /// Move face `permutation[i]` to position `i` for every `i`.
    fn apply_permutation(&mut self, permutation: &[usize]) {
        let size = permutation.len();
        for i in 0..size {
            let mut source = permutation[i];
            let mut steps = 0;
            // faces before i were already moved; follow where they went
            while source < i {
                source = permutation[source];
                steps += 1;
                if steps > size {
                    panic!("permutation cycle at face {} does not terminate", i);
                }
            }
            self.swap(i, source);
        }
    }
}

/// Sorts `dest[from..to]` by material. `src` holds the same values on entry
/// and is used as scratch.
fn merge_sort(src: &mut [usize], dest: &mut [usize], from: usize, to: usize, material: &[i32]) {
    if to - from < INSERTION_SORT_THRESHOLD {
        insertion_sort(&mut dest[from..to], material);
        return;
    }

    let mid = (from + to) / 2;
    merge_sort(dest, src, from, mid, material);
    merge_sort(dest, src, mid, to, material);

    if material[src[mid - 1]] <= material[src[mid]] {
        dest[from..to].copy_from_slice(&src[from..to]);
        return;
    }

    let (mut p, mut q) = (from, mid);
    for slot in &mut dest[from..to] {
        if q >= to || (p < mid && material[src[p]] <= material[src[q]]) {
            *slot = src[p];
            p += 1;
        } else {
            *slot = src[q];
            q += 1;
        }
    }
}

fn insertion_sort(index: &mut [usize], material: &[i32]) {
    for i in 1..index.len() {
        let mut j = i;
        while j > 0 && material[index[j - 1]] > material[index[j]] {
            index.swap(j, j - 1);
            j -= 1;
        }
    }
}
