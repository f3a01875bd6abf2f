/// Static order in which replicas are handed to the thread pool.
///
/// Each controller's slots are visited in chunks of `cores_per_controller`,
/// alternating between the cold end and the hot end of its ladder, and the
/// controllers are interleaved chunk by chunk. Consecutive work items then
/// mix cheap and expensive replicas when rayon splits the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    replicas_per_controller: usize,
    order: Vec<usize>,
}

impl Placement {
    pub fn folded(
        replicas_per_controller: usize,
        num_controllers: usize,
        cores_per_controller: usize,
    ) -> Self {
        let chunks = fold_chunks(replicas_per_controller, cores_per_controller.max(1));

        let mut order = Vec::with_capacity(replicas_per_controller * num_controllers);
        for chunk in &chunks {
            for controller in 0..num_controllers {
                let offset = controller * replicas_per_controller;
                order.extend(chunk.iter().map(|&slot| offset + slot));
            }
        }

        Self {
            replicas_per_controller,
            order,
        }
    }

    /// Global replica ids in dispatch order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn controller_of(&self, replica: usize) -> usize {
        replica / self.replicas_per_controller
    }

    pub fn local_index(&self, replica: usize) -> usize {
        replica % self.replicas_per_controller
    }
}

fn fold_chunks(len: usize, chunk: usize) -> Vec<Vec<usize>> {
    let mut chunks = Vec::new();
    let (mut lo, mut hi) = (0, len);
    let mut from_cold_end = true;

    while lo < hi {
        let take = chunk.min(hi - lo);
        if from_cold_end {
            chunks.push((lo..lo + take).collect());
            lo += take;
        } else {
            chunks.push((hi - take..hi).rev().collect());
            hi -= take;
        }
        from_cold_end = !from_cold_end;
    }
    chunks
}
