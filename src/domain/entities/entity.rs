use std::fmt;

use crate::domain::entities::column::{ColumnDescriptor, ColumnRegistry, FilterOption};

/// The record types listed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Zones,
    Houses,
    Stores,
    Packages,
    Etags,
    Wallets,
    Users,
    Promotions,
    Transactions,
    Orders,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Zones,
        EntityKind::Houses,
        EntityKind::Stores,
        EntityKind::Packages,
        EntityKind::Etags,
        EntityKind::Wallets,
        EntityKind::Users,
        EntityKind::Promotions,
        EntityKind::Transactions,
        EntityKind::Orders,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            EntityKind::Zones => "zones",
            EntityKind::Houses => "houses",
            EntityKind::Stores => "stores",
            EntityKind::Packages => "packages",
            EntityKind::Etags => "etags",
            EntityKind::Wallets => "wallets",
            EntityKind::Users => "users",
            EntityKind::Promotions => "promotions",
            EntityKind::Transactions => "transactions",
            EntityKind::Orders => "orders",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            EntityKind::Zones => "Zones",
            EntityKind::Houses => "Houses",
            EntityKind::Stores => "Stores",
            EntityKind::Packages => "Packages",
            EntityKind::Etags => "E-tags",
            EntityKind::Wallets => "Wallets",
            EntityKind::Users => "Users",
            EntityKind::Promotions => "Promotions",
            EntityKind::Transactions => "Transactions",
            EntityKind::Orders => "Orders",
        }
    }

    /// Listing endpoint, relative to the API base URL.
    pub fn endpoint(self) -> String {
        format!("/api/v1/{}", self.key())
    }

    /// Transactions are an append-only ledger.
    pub const fn supports_delete(self) -> bool {
        !matches!(self, EntityKind::Transactions)
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }

    pub fn registry(self) -> ColumnRegistry {
        let registry = ColumnRegistry::new(self.key());
        match self {
            EntityKind::Zones => registry
                .column(ColumnDescriptor::new("name", "Name").searchable().sortable())
                .column(ColumnDescriptor::new("location", "Location").searchable())
                .column(ColumnDescriptor::new("createdAt", "Created").sortable()),
            EntityKind::Houses => registry
                .column(ColumnDescriptor::new("houseName", "House").searchable().sortable())
                .column(ColumnDescriptor::new("location", "Location").searchable())
                .column(ColumnDescriptor::new("address", "Address").searchable())
                .column(ColumnDescriptor::new("isRent", "Rented").filterable(["true", "false"]))
                .column(ColumnDescriptor::new("createdAt", "Created").sortable()),
            EntityKind::Stores => registry
                .column(ColumnDescriptor::new("name", "Name").searchable().sortable())
                .column(ColumnDescriptor::new("address", "Address").searchable())
                .column(ColumnDescriptor::new("phoneNumber", "Phone").searchable())
                .column(
                    ColumnDescriptor::new("storeType", "Type").filterable_with(vec![
                        FilterOption::new("0", "Food"),
                        FilterOption::new("1", "Clothing"),
                        FilterOption::new("2", "Service"),
                    ]),
                )
                .column(
                    ColumnDescriptor::new("status", "Status")
                        .filterable(["Opened", "Closed", "Blocked"]),
                ),
            EntityKind::Packages => registry
                .column(ColumnDescriptor::new("name", "Name").searchable().sortable())
                .column(ColumnDescriptor::new("price", "Price").sortable())
                .column(ColumnDescriptor::new("duration", "Duration (days)").sortable())
                .column(ColumnDescriptor::new("description", "Description")),
            EntityKind::Etags => registry
                .column(ColumnDescriptor::new("etagCode", "Code").searchable())
                .column(ColumnDescriptor::new("fullName", "Holder").searchable().sortable())
                .column(ColumnDescriptor::new("phoneNumber", "Phone").searchable())
                .column(
                    ColumnDescriptor::new("status", "Status")
                        .filterable(["Active", "Inactive", "Block"]),
                )
                .column(ColumnDescriptor::new("endDate", "Expires").sortable()),
            EntityKind::Wallets => registry
                .column(ColumnDescriptor::new("walletType", "Type").filterable_with(vec![
                    FilterOption::new("0", "Etag"),
                    FilterOption::new("1", "Store"),
                    FilterOption::new("2", "User"),
                ]))
                .column(ColumnDescriptor::new("balance", "Balance").sortable())
                .column(ColumnDescriptor::new("balanceHistory", "Lifetime").sortable())
                .column(ColumnDescriptor::new("updatedAt", "Updated").sortable()),
            EntityKind::Users => registry
                .column(ColumnDescriptor::new("fullName", "Full name").searchable().sortable())
                .column(ColumnDescriptor::new("email", "Email").searchable())
                .column(ColumnDescriptor::new("phoneNumber", "Phone").searchable())
                .column(
                    ColumnDescriptor::new("roleName", "Role")
                        .filterable(["Admin", "CashierWeb", "CashierApp", "Store", "Tourist"]),
                )
                .column(
                    ColumnDescriptor::new("status", "Status")
                        .filterable(["Active", "PendingVerify", "Disable", "Ban"]),
                ),
            EntityKind::Promotions => registry
                .column(ColumnDescriptor::new("promotionCode", "Code").searchable())
                .column(ColumnDescriptor::new("name", "Name").searchable().sortable())
                .column(ColumnDescriptor::new("discountPercent", "Discount %").sortable())
                .column(
                    ColumnDescriptor::new("status", "Status")
                        .filterable(["Active", "Inactive", "Expired"]),
                )
                .column(ColumnDescriptor::new("endDate", "Ends").sortable()),
            EntityKind::Transactions => registry
                .column(ColumnDescriptor::new("description", "Description").searchable())
                .column(
                    ColumnDescriptor::new("type", "Type")
                        .filterable(["Deposit", "Withdraw", "Transfer", "SellingProduct"]),
                )
                .column(ColumnDescriptor::new("amount", "Amount").sortable())
                .column(
                    ColumnDescriptor::new("status", "Status")
                        .filterable(["Pending", "Success", "Fail"]),
                )
                .column(ColumnDescriptor::new("crDate", "Date").sortable()),
            EntityKind::Orders => registry
                .column(ColumnDescriptor::new("invoiceId", "Invoice").searchable())
                .column(ColumnDescriptor::new("name", "Name").searchable())
                .column(ColumnDescriptor::new("totalAmount", "Total").sortable())
                .column(
                    ColumnDescriptor::new("paymentType", "Payment")
                        .filterable(["Cash", "Momo", "VnPay", "PayOS", "ZaloPay"]),
                )
                .column(
                    ColumnDescriptor::new("status", "Status")
                        .filterable(["Pending", "Completed", "Canceled"]),
                )
                .column(ColumnDescriptor::new("crDate", "Date").sortable()),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}
