pub mod common {
    tonic::include_proto!("foodbro.common");
}

pub mod auth_service {
    tonic::include_proto!("foodbro.auth_service");
}

pub mod restaurant_service {
    tonic::include_proto!("foodbro.restaurant_service");
}

pub mod order_service {
    tonic::include_proto!("foodbro.order_service");
}
