//! Management reports computed over stored orders.

use serde::Serialize;

use crate::order::{Money, Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    pub period: &'static str,
    pub total_revenue: Money,
    pub order_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionTimeReport {
    pub avg_execution_minutes: f64,
    pub orders_counted: usize,
}

/// Sums the totals of every order.
pub fn revenue(orders: &[Order]) -> RevenueReport {
    RevenueReport {
        period: "all_time",
        total_revenue: orders.iter().map(Order::total).sum(),
        order_count: orders.len(),
    }
}

/// Averages execution time over finished orders that carry both timestamps.
pub fn average_execution_time(orders: &[Order]) -> ExecutionTimeReport {
    let minutes: Vec<f64> = orders
        .iter()
        .filter(|o| matches!(o.status(), OrderStatus::Completed | OrderStatus::Delivered))
        .filter_map(Order::execution_minutes)
        .collect();

    let avg_execution_minutes = if minutes.is_empty() {
        0.0
    } else {
        minutes.iter().sum::<f64>() / minutes.len() as f64
    };

    ExecutionTimeReport {
        avg_execution_minutes,
        orders_counted: minutes.len(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use common::{ClientId, OrderId, VehicleId};
    use uuid::Uuid;

    use super::*;
    use crate::order::{ItemType, OrderHeader};

    fn finished(status: OrderStatus, minutes: i64) -> Order {
        let started = Utc::now() - Duration::hours(3);
        Order::restore(
            OrderHeader {
                id: OrderId::new(),
                client_id: ClientId::new(),
                vehicle_id: VehicleId::new(),
                status,
                created_at: started,
                updated_at: started,
                started_at: Some(started),
                finished_at: Some(started + Duration::minutes(minutes)),
            },
            Vec::new(),
        )
    }

    #[test]
    fn test_revenue_sums_all_orders() {
        let mut a = Order::new(ClientId::new(), VehicleId::new()).unwrap();
        a.add_item(Uuid::new_v4(), ItemType::Service, "Wash", 1, Money::from_cents(5000))
            .unwrap();
        let mut b = Order::new(ClientId::new(), VehicleId::new()).unwrap();
        b.add_item(Uuid::new_v4(), ItemType::Part, "Bulb", 2, Money::from_cents(750))
            .unwrap();

        let report = revenue(&[a, b]);
        assert_eq!(report.period, "all_time");
        assert_eq!(report.total_revenue.cents(), 6500);
        assert_eq!(report.order_count, 2);
    }

    #[test]
    fn test_average_execution_time() {
        let orders = vec![
            finished(OrderStatus::Completed, 30),
            finished(OrderStatus::Delivered, 90),
            // in execution with stale timestamps is not counted
            finished(OrderStatus::InExecution, 1000),
            Order::new(ClientId::new(), VehicleId::new()).unwrap(),
        ];
        let report = average_execution_time(&orders);
        assert_eq!(report.orders_counted, 2);
        assert!((report.avg_execution_minutes - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_execution_time_empty() {
        let report = average_execution_time(&[]);
        assert_eq!(report.orders_counted, 0);
        assert_eq!(report.avg_execution_minutes, 0.0);
    }
}
