use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use super::{Isbn, MemberId, QueueError};

/// 予約リクエスト
///
/// 在庫がないときに行われた貸出希望。日付は持たず、行列内の位置が順序を表す。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub member_id: MemberId,
    pub isbn: Isbn,
}

/// ISBNごとの予約待ち行列
///
/// 厳密なFIFO。優先度による並べ替え（割り込み）は一切行わない。
#[derive(Debug, Default)]
pub struct RequestQueue {
    queues: HashMap<Isbn, VecDeque<Request>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾にリクエストを追加し、1始まりの待ち順を返す
    pub fn enqueue(&mut self, member_id: MemberId, isbn: &Isbn) -> usize {
        let queue = self.queues.entry(isbn.clone()).or_default();
        queue.push_back(Request {
            member_id,
            isbn: isbn.clone(),
        });
        queue.len()
    }

    /// 現在の1始まりの待ち順
    pub fn position_of(&self, member_id: MemberId, isbn: &Isbn) -> Result<usize, QueueError> {
        self.queues
            .get(isbn)
            .and_then(|queue| queue.iter().position(|r| r.member_id == member_id))
            .map(|index| index + 1)
            .ok_or(QueueError::NotQueued)
    }

    /// 最も早いリクエストを取り出す
    pub fn dequeue_head(&mut self, isbn: &Isbn) -> Result<Request, QueueError> {
        let queue = self.queues.get_mut(isbn).ok_or(QueueError::Empty)?;
        let head = queue.pop_front().ok_or(QueueError::Empty)?;
        if queue.is_empty() {
            self.queues.remove(isbn);
        }
        Ok(head)
    }

    pub fn len(&self, isbn: &Isbn) -> usize {
        self.queues.get(isbn).map_or(0, VecDeque::len)
    }

    pub fn is_empty(&self, isbn: &Isbn) -> bool {
        self.len(isbn) == 0
    }
}
