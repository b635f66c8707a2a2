/*
 *  cheapest.rs
 *
 *  agileboard - tariff rates and time on a matrix
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cheapest contiguous run of tariff periods
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::NaiveDateTime;

use crate::tariff::RatePoint;

/// Start of the `window_len` consecutive periods with the lowest total.
///
/// Sliding sum, single pass. Ties keep the earliest window. `None` when
/// there are fewer prices than the window or the window is empty.
///
/// Sums are kept in ten-thousandths of a penny so equal windows compare equal.
pub fn find_lowest_contiguous_period(prices: &[RatePoint], window_len: usize) -> Option<NaiveDateTime> {
    if window_len == 0 || window_len > prices.len() {
        return None;
    }

    let fixed: Vec<i64> = prices.iter().map(|p| to_fixed(p.price)).collect();
    let mut sum: i64 = fixed[..window_len].iter().sum();
    let mut best_sum = sum;
    let mut best_start = 0;

    for i in window_len..fixed.len() {
        sum += fixed[i] - fixed[i - window_len];
        if sum < best_sum {
            best_sum = sum;
            best_start = i + 1 - window_len;
        }
    }

    Some(prices[best_start].valid_from)
}

fn to_fixed(price: f64) -> i64 {
    (price * 10_000.0).round() as i64
}
