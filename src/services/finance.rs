//! Financial summaries and payment-reminder data.
//!
//! The charge message is plain data for external deep links (WhatsApp,
//! dialer); the server never performs the send itself.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::rental::RentalDetails,
    repository::Repository,
    services::rentals::month_range_of,
};

/// Revenue summary across all rentals
#[derive(Debug, Serialize, ToSchema)]
pub struct FinancialSummary {
    /// Sum of received amounts (falling back to rental totals) over paid rentals
    pub total_revenue: f64,
    /// Sum of totals over active, payment-pending rentals
    pub pending_revenue: f64,
    /// Paid revenue with a payment date in the current calendar month
    pub month_revenue: f64,
}

/// Payment reminder data for one rental
#[derive(Debug, Serialize, ToSchema)]
pub struct ChargeMessage {
    pub rental_id: i64,
    pub customer_name: String,
    /// Digits-only phone number, when one is on file
    pub phone: Option<String>,
    /// Formatted reminder text
    pub message: String,
    /// Ready-to-open wa.me link, when a phone number is on file
    pub whatsapp_url: Option<String>,
}

#[derive(Clone)]
pub struct FinanceService {
    repository: Repository,
}

impl FinanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Revenue summary: total, pending and current-month figures
    pub async fn summary(&self) -> AppResult<FinancialSummary> {
        super::reconcile_now(&self.repository).await?;

        let (month_start, month_end) = month_range_of(chrono::Local::now().date_naive());

        Ok(FinancialSummary {
            total_revenue: self.repository.rentals.total_revenue().await?,
            pending_revenue: self.repository.rentals.pending_revenue().await?,
            month_revenue: self
                .repository
                .rentals
                .revenue_between(month_start, month_end)
                .await?,
        })
    }

    /// Active rentals still waiting for payment
    pub async fn pending_charges(&self) -> AppResult<Vec<RentalDetails>> {
        super::reconcile_now(&self.repository).await?;
        self.repository.rentals.list_pending_payment().await
    }

    /// Build the payment reminder for a rental
    pub async fn charge_message(&self, rental_id: i64) -> AppResult<ChargeMessage> {
        let rental = self.repository.rentals.get_details(rental_id).await?;
        Ok(build_charge_message(&rental))
    }
}

/// Format the reminder text and deep-link data for a rental
pub fn build_charge_message(rental: &RentalDetails) -> ChargeMessage {
    let message = format!(
        "Olá {}!\n\n\
         Lembrete de pagamento da locação:\n\n\
         Veículo: {} - {}\n\
         Período: {} até {}\n\
         Dias: {}\n\
         Valor total: R$ {:.2}\n\n\
         Aguardamos seu pagamento via PIX ou Dinheiro.\n\n\
         Obrigado!",
        rental.customer_name,
        rental.vehicle_model,
        rental.vehicle_plate,
        rental.start_date.format("%d/%m/%Y"),
        rental.end_date.format("%d/%m/%Y"),
        rental.day_count,
        rental.total_amount,
    );

    let phone: Option<String> = rental.customer_phone.as_ref().map(|p| {
        p.chars().filter(|c| c.is_ascii_digit()).collect()
    });

    let whatsapp_url = phone.as_ref().filter(|p| !p.is_empty()).map(|digits| {
        format!(
            "https://wa.me/55{}?text={}",
            digits,
            urlencoding::encode(&message)
        )
    });

    ChargeMessage {
        rental_id: rental.id,
        customer_name: rental.customer_name.clone(),
        phone,
        message,
        whatsapp_url,
    }
}
