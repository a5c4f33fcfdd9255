use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Isbn, LendingPolicy, MemberId, OfferError};

/// 取り置き
///
/// 1冊を特定の会員のために確保した、受け取り待ちの状態。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub member_id: MemberId,
    pub isbn: Isbn,
    pub offered_on: NaiveDate,
    pub expires_on: NaiveDate,
}

/// 取り置き台帳
///
/// 会員×ISBNにつき取り置きは1件まで。作成順に保持するので失効の走査順は決定的。
#[derive(Debug)]
pub struct OfferLedger {
    offers: Vec<Offer>,
    policy: LendingPolicy,
}

impl OfferLedger {
    pub fn new() -> Self {
        Self::with_policy(LendingPolicy::default())
    }

    pub fn with_policy(policy: LendingPolicy) -> Self {
        Self {
            offers: Vec::new(),
            policy,
        }
    }

    /// 取り置きを作成する（期限 = 今日 + 受け取り期間）
    ///
    /// # エラー
    /// - 同じ会員×ISBNの取り置きがあれば`OfferError::DuplicateOffer`
    /// - 期限日が暦の範囲を外れれば`OfferError::DateOutOfRange`
    pub fn create_offer(
        &mut self,
        member_id: MemberId,
        isbn: &Isbn,
        today: NaiveDate,
    ) -> Result<&Offer, OfferError> {
        if self.find(member_id, isbn).is_some() {
            return Err(OfferError::DuplicateOffer);
        }
        let expires_on = self
            .policy
            .offer_expiry(today)
            .ok_or(OfferError::DateOutOfRange {
                from: today,
                days: self.policy.offer_window_days,
            })?;
        self.offers.push(Offer {
            member_id,
            isbn: isbn.clone(),
            offered_on: today,
            expires_on,
        });
        Ok(&self.offers[self.offers.len() - 1])
    }

    pub fn find(&self, member_id: MemberId, isbn: &Isbn) -> Option<&Offer> {
        self.offers
            .iter()
            .find(|o| o.member_id == member_id && &o.isbn == isbn)
    }

    /// 取り置きを受け取る（台帳から取り除いて返す）
    pub fn claim(&mut self, member_id: MemberId, isbn: &Isbn) -> Result<Offer, OfferError> {
        let index = self
            .offers
            .iter()
            .position(|o| o.member_id == member_id && &o.isbn == isbn)
            .ok_or(OfferError::NoSuchOffer)?;
        Ok(self.offers.remove(index))
    }

    /// 受け取りを取り消し、取り置きを元の期限のまま戻す
    pub fn reinstate(&mut self, offer: Offer) -> Result<(), OfferError> {
        if self.find(offer.member_id, &offer.isbn).is_some() {
            return Err(OfferError::DuplicateOffer);
        }
        self.offers.push(offer);
        Ok(())
    }

    /// `expires_on < today` の取り置きを、消費されるたびに台帳から取り除く遅延列
    ///
    /// 在庫を戻すのは呼び出し側（コーディネーター）の責務。
    pub fn expire_before(&mut self, today: NaiveDate) -> ExpiredOffers<'_> {
        ExpiredOffers {
            offers: &mut self.offers,
            today,
            cursor: 0,
        }
    }

    pub fn offers_for(&self, member_id: MemberId) -> impl Iterator<Item = &Offer> {
        self.offers.iter().filter(move |o| o.member_id == member_id)
    }

    /// ISBNごとの取り置き数
    pub fn count_for(&self, isbn: &Isbn) -> usize {
        self.offers.iter().filter(|o| &o.isbn == isbn).count()
    }
}

impl Default for OfferLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// [`OfferLedger::expire_before`] が返すイテレーター
#[derive(Debug)]
pub struct ExpiredOffers<'a> {
    offers: &'a mut Vec<Offer>,
    today: NaiveDate,
    cursor: usize,
}

impl Iterator for ExpiredOffers<'_> {
    type Item = Offer;

    fn next(&mut self) -> Option<Offer> {
        while self.cursor < self.offers.len() {
            if self.offers[self.cursor].expires_on < self.today {
                return Some(self.offers.remove(self.cursor));
            }
            self.cursor += 1;
        }
        None
    }
}
