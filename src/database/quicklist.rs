//! Сборка списка из узлов quicklist.
//!
//! Quicklist — это последовательность узлов, каждый из которых либо упакован
//! (ziplist в первой версии, listpack во второй), либо хранит ровно один
//! элемент как есть. Значения отдаются в порядке узлов.

use bytes::Bytes;
use rdbstream_error::{EncodingSite, RdbError, RdbResult};

use super::{listpack, ziplist, Scalar};

const QUICKLIST_NODE_CONTAINER_PLAIN: u64 = 1;
const QUICKLIST_NODE_CONTAINER_PACKED: u64 = 2;

/// Узел quicklist после извлечения строки из потока.
#[derive(Debug, Clone)]
pub enum QuicklistNode {
    /// Узел первой версии: ziplist.
    Ziplist(Bytes),
    /// Узел второй версии с одним элементом.
    Plain(Bytes),
    /// Узел второй версии: listpack.
    Listpack(Bytes),
}

impl QuicklistNode {
    /// Узел второй версии по типу контейнера.
    pub fn from_container(
        container: u64,
        payload: Bytes,
    ) -> RdbResult<Self> {
        match container {
            QUICKLIST_NODE_CONTAINER_PLAIN => Ok(QuicklistNode::Plain(payload)),
            QUICKLIST_NODE_CONTAINER_PACKED => Ok(QuicklistNode::Listpack(payload)),
            other => Err(RdbError::unsupported(
                EncodingSite::QuicklistContainer,
                u8::try_from(other).unwrap_or(u8::MAX),
            )
            .into()),
        }
    }

    fn decode(self) -> RdbResult<Vec<Scalar>> {
        match self {
            QuicklistNode::Ziplist(blob) => ziplist::decode(&blob),
            QuicklistNode::Listpack(blob) => listpack::decode(&blob),
            QuicklistNode::Plain(value) => Ok(vec![Scalar::Bytes(value)]),
        }
    }
}

/// Накопитель значений quicklist по сегментам.
#[derive(Debug, Default, Clone)]
pub struct QuickList {
    segments: Vec<Vec<Scalar>>,
    len: usize,
}

impl QuickList {
    pub fn with_nodes(nodes: usize) -> Self {
        Self {
            segments: Vec::with_capacity(nodes.min(1024)),
            len: 0,
        }
    }

    /// Декодирует узел и добавляет его значения в конец списка.
    pub fn push(
        &mut self,
        node: QuicklistNode,
    ) -> RdbResult<()> {
        let values = node.decode()?;
        self.len += values.len();
        self.segments.push(values);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Все значения в порядке узлов.
    pub fn into_values(self) -> Vec<Scalar> {
        let mut out = Vec::with_capacity(self.len);
        for segment in self.segments {
            out.extend(segment);
        }
        out
    }
}
