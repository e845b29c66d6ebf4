pub mod lightning;

pub use lightning::{
    CreateInvoiceRequest, GenerateWalletRequest, Invoice, InvoiceStatus, PayInvoiceRequest,
    Payment, PaymentStatus, Wallet,
};
