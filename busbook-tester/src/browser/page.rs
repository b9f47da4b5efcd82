//! The bus detail page of a deployed UI, seen through WebDriver.
use anyhow::{Context, Result, bail};
use busbook_core::model::{BookingKey, format_travel_date};
use thirtyfour::prelude::*;

const SEAT: &str = "button.seat";
const AVAILABLE_SEAT: &str = "button.seat--available";
const BOOKED_SEAT: &str = "button.seat--booked";
const ROUTE_TITLE: &str = ".route-header h1";

#[derive(Debug, Clone)]
pub struct DetailPage<'a> {
    driver: &'a WebDriver,
    url: String,
}

/// `<base>/bus/<id>/<date>`.
#[must_use]
pub fn detail_url(base_url: &str, key: &BookingKey) -> String {
    format!(
        "{}/bus/{}/{}",
        base_url.trim_end_matches('/'),
        key.bus_id,
        format_travel_date(key.date)
    )
}

fn seat_selector(seat_id: &str) -> String {
    format!("button.seat[data-seat='{seat_id}']")
}

impl<'a> DetailPage<'a> {
    #[must_use]
    pub fn new(driver: &'a WebDriver, base_url: &str, key: &BookingKey) -> Self {
        Self {
            driver,
            url: detail_url(base_url, key),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn open(&self) -> Result<()> {
        self.driver
            .goto(self.url.as_str())
            .await
            .with_context(|| format!("navigating to {}", self.url))
    }

    pub async fn wait_for_seats(&self) -> Result<()> {
        self.driver
            .find(By::Css(SEAT))
            .await
            .context("seat map never rendered")?;
        Ok(())
    }

    pub async fn wait_for_title(&self) -> Result<()> {
        let title = self
            .driver
            .find(By::Css(ROUTE_TITLE))
            .await
            .context("route header missing")?
            .text()
            .await?;
        if title.trim().is_empty() {
            bail!("route header is empty");
        }
        Ok(())
    }

    async fn seat(&self, seat_id: &str) -> Result<WebElement> {
        self.driver
            .find(By::Css(seat_selector(seat_id)))
            .await
            .with_context(|| format!("seat {seat_id} not on the map"))
    }

    async fn first_matching(&self, selector: &str) -> Result<Option<String>> {
        let seats = self.driver.find_all(By::Css(selector)).await?;
        match seats.first() {
            Some(seat) => Ok(seat.attr("data-seat").await?),
            None => Ok(None),
        }
    }

    pub async fn first_available_seat(&self) -> Result<String> {
        self.first_matching(AVAILABLE_SEAT)
            .await?
            .context("no available seat on the map")
    }

    pub async fn first_booked_seat(&self) -> Result<Option<String>> {
        self.first_matching(BOOKED_SEAT).await
    }

    pub async fn toggle(&self, seat_id: &str) -> Result<()> {
        self.seat(seat_id).await?.click().await?;
        Ok(())
    }

    pub async fn is_pressed(&self, seat_id: &str) -> Result<bool> {
        let pressed = self.seat(seat_id).await?.attr("aria-pressed").await?;
        Ok(pressed.as_deref() == Some("true"))
    }

    pub async fn is_disabled(&self, seat_id: &str) -> Result<bool> {
        Ok(!self.seat(seat_id).await?.is_enabled().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn detail_url_joins_base_and_booking() {
        let key = BookingKey::new("bus-7", NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());
        assert_eq!(
            detail_url("http://localhost:8080/", &key),
            "http://localhost:8080/bus/bus-7/2026-11-02"
        );
        assert_eq!(seat_selector("B3"), "button.seat[data-seat='B3']");
    }
}
