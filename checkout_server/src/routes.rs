//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution:
//!
//! ```nocompile
//!     async fn my_handler() -> impl Responder {
//!         tokio::time::sleep(Duration::from_secs(5)).await; // <-- Ok. Worker thread will handle other requests here
//!     }
//! ```
use actix_web::{get, web, HttpResponse, Responder};
use checkout_engine::{
    db_types::OrderNumber,
    traits::{CatalogLookup, CheckoutDatabase, OrderManagement, PaymentInitiator},
    CheckoutApi,
    OrderQueryApi,
};
use log::*;

use crate::{
    data_objects::{CheckoutRequest, CheckoutResponse, OrderStatusResponse},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(place_order => Post "/checkout" impl CheckoutDatabase, CatalogLookup, PaymentInitiator);
pub async fn place_order<B, C, P>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<CheckoutApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    C: CatalogLookup,
    P: PaymentInitiator,
{
    let request = body.into_inner();
    debug!("🛒️ POST /checkout ({} items, method {})", request.items.len(), request.payment_method);
    let request = request.try_into_place_order()?;
    let outcome = api.place_order(request).await?;
    info!("🛒️ Order {} placed ({}).", outcome.order.order_number, outcome.order.status);
    Ok(HttpResponse::Ok().json(CheckoutResponse::from(outcome)))
}

//----------------------------------------------  Order status  -------------------------------------------------
route!(order_status => Get "/order/{order_number}" impl OrderManagement);
pub async fn order_status<B>(
    path: web::Path<String>,
    api: web::Data<OrderQueryApi<B>>,
) -> Result<HttpResponse, ServerError>
where B: OrderManagement
{
    let number = OrderNumber::from(path.into_inner());
    trace!("💻️ GET order status for {number}");
    let order = api.order_by_number(&number).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    match order {
        Some(order) => {
            Ok(HttpResponse::Ok().json(OrderStatusResponse { order_number: order.order_number, status: order.status }))
        },
        None => Err(ServerError::NoRecordFound(format!("No order with number {number}"))),
    }
}
